//! Command-line interface for bump-deps.
//!
//! Two binaries share this module:
//!
//! - `bump-deps <COMPONENT>` bumps any supported [`Component`]
//! - `bump-envoy` is the standalone Envoy variant with the component fixed
//!
//! Both accept the same [`BumpArgs`].
//!
//! # Example
//!
//! ```bash
//! # Bump Envoy to the newest v1.31.x and record the result for the PR step
//! bump-deps envoy --release-track v1.31 \
//!     --output-version-file version.txt \
//!     --commit-message-file commit-message.txt
//!
//! # Bump Go without running `go mod tidy`
//! bump-deps golang --release-track 1.24 --skip-regenerate
//! ```
//!
//! # Logging
//!
//! Logs go to stderr. `--verbose` enables debug output, `--quiet` only shows
//! errors, and `RUST_LOG` takes precedence over both when set.

use anyhow::Result;
use clap::{Args, Parser};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::BumpConfig;
use crate::report::{Report, Reporter};
use crate::updater::{self, BumpOptions, Component};

/// Arguments shared by both binaries.
#[derive(Debug, Clone, Args)]
pub struct BumpArgs {
    /// Release track to follow, e.g. `v1.31` for Envoy or `1.24` for Go
    #[arg(long, value_name = "TRACK")]
    pub release_track: String,

    /// Write the resolved version to this file
    #[arg(long, value_name = "PATH")]
    pub output_version_file: Option<PathBuf>,

    /// Write the commit message to this file
    #[arg(long, value_name = "PATH")]
    pub commit_message_file: Option<PathBuf>,

    /// Project root the file lists are resolved against
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub project_root: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Patch files but do not run the regeneration command
    #[arg(long)]
    pub skip_regenerate: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl BumpArgs {
    /// Log level implied by `--verbose` / `--quiet`.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Translate the flags into [`BumpOptions`].
    pub fn options(&self) -> BumpOptions {
        BumpOptions::new(self.release_track.clone())
            .with_project_root(self.project_root.clone())
            .with_skip_regenerate(self.skip_regenerate)
            .with_reporter(Reporter::new(
                self.output_version_file.clone(),
                self.commit_message_file.clone(),
            ))
    }

    /// Load configuration and bump `component`.
    pub async fn execute(self, component: Component) -> Result<Report> {
        init_logging(self.log_level());
        debug!(args = ?self, %component, "Parsed arguments");

        let config = BumpConfig::load(self.config.as_deref()).await?;
        updater::bump(component, &config, &self.options()).await
    }
}

/// `bump-deps` command line.
#[derive(Debug, Parser)]
#[command(
    name = "bump-deps",
    about = "Bump pinned upstream versions (Envoy, Go) in a project checkout",
    version,
    long_about = "Resolves the newest upstream release on a release track, rewrites the pinned \
                  version across the project's files, runs the component's regeneration \
                  command, and optionally writes the version and a commit message for the \
                  CI step that opens the pull request."
)]
pub struct Cli {
    /// Component to bump
    #[arg(value_enum)]
    pub component: Component,

    #[command(flatten)]
    pub args: BumpArgs,
}

impl Cli {
    /// Run the bump.
    pub async fn execute(self) -> Result<()> {
        self.args.execute(self.component).await.map(|_| ())
    }
}

/// `bump-envoy` command line.
#[derive(Debug, Parser)]
#[command(
    name = "bump-envoy",
    about = "Bump the pinned Envoy image in a project checkout",
    version
)]
pub struct EnvoyCli {
    #[command(flatten)]
    pub args: BumpArgs,
}

impl EnvoyCli {
    /// Run the Envoy bump.
    pub async fn execute(self) -> Result<()> {
        self.args.execute(Component::Envoy).await.map(|_| ())
    }
}

/// Install the global tracing subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this more than once
/// is harmless; later calls leave the first subscriber in place.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
