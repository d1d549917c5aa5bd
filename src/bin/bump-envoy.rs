//! Standalone Envoy bump.
//!
//! Same pipeline as `bump-deps envoy`, kept as its own binary for workflows
//! that only ever bump Envoy.

use anyhow::Result;
use bump_deps::cli::EnvoyCli;
use bump_deps::core::error::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = EnvoyCli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute().await {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
    Ok(())
}
