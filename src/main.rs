//! bump-deps CLI entry point
//!
//! Parses the command line, runs the bump, and renders any failure with its
//! context and a suggestion before exiting with status 1.

use anyhow::Result;
use bump_deps::cli;
use bump_deps::core::error::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
