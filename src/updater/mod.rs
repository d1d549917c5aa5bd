//! Component updaters and the bump pipeline.
//!
//! Every supported upstream component implements [`Updater`]:
//!
//! - [`Updater::process`] resolves the newest release on a track, patches the
//!   project files and runs the regeneration command
//! - [`Updater::release`] returns the resolved version
//! - [`Updater::commit_message`] renders the commit message for the bump
//!
//! The set of components is closed ([`Component`]); [`bump`] maps a component
//! to its updater and runs the pipeline:
//!
//! ```text
//! resolve release ──> patch files ──> regenerate ──> report
//!   (release)          (patch)        (patch::regenerate)  (report)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use bump_deps::config::BumpConfig;
//! use bump_deps::report::Reporter;
//! use bump_deps::updater::{BumpOptions, Component, bump};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BumpConfig::load(None).await?;
//! let options = BumpOptions::new("v1.31").with_reporter(Reporter::new(
//!     Some("version.txt".into()),
//!     Some("commit-message.txt".into()),
//! ));
//! let report = bump(Component::Envoy, &config, &options).await?;
//! println!("bumped to {}", report.version);
//! # Ok(())
//! # }
//! ```

pub mod envoy;
pub mod golang;
pub mod state;

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

use crate::config::{BumpConfig, EndpointConfig};
use crate::core::BumpError;
use crate::patch::regenerate::RegenerateCommand;
use crate::release::ReleaseClient;
use crate::report::{Report, Reporter};

pub use envoy::EnvoyUpdater;
pub use golang::GolangUpdater;
pub use state::UpdaterState;

/// Upstream components that can be bumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Component {
    /// The Envoy proxy image
    Envoy,
    /// The Go toolchain and build base image
    Golang,
}

impl Component {
    /// Lowercase name as used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Envoy => "envoy",
            Self::Golang => "golang",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities shared by every component updater.
#[allow(async_fn_in_trait)]
pub trait Updater {
    /// Which component this updater handles.
    fn component(&self) -> Component;

    /// Resolve the newest release on `release_track`, patch the project and
    /// regenerate derived files.
    async fn process(&mut self, release_track: &str) -> Result<()>;

    /// The resolved version.
    fn release(&self) -> Result<&str, BumpError>;

    /// Commit message describing the bump.
    fn commit_message(&self) -> Result<String, BumpError>;
}

/// Everything an updater needs from the outside world.
#[derive(Debug, Clone)]
pub struct UpdaterContext {
    /// HTTP client for release lookups
    pub client: ReleaseClient,
    /// Endpoints to query
    pub endpoints: EndpointConfig,
    /// Root the component's file list is resolved against
    pub project_root: PathBuf,
    /// Command to run after patching; `None` skips regeneration
    pub regenerate: Option<RegenerateCommand>,
}

impl UpdaterContext {
    /// Build the context for `component` from configuration and options.
    pub fn new(component: Component, config: &BumpConfig, options: &BumpOptions) -> Result<Self> {
        let regenerate = if options.skip_regenerate {
            None
        } else {
            let command = RegenerateCommand::from_argv(config.regenerate.command_for(component))?
                .current_dir(&options.project_root)
                .timeout(config.regenerate.timeout());
            Some(command)
        };

        Ok(Self {
            client: ReleaseClient::new(config)?,
            endpoints: config.endpoints.clone(),
            project_root: options.project_root.clone(),
            regenerate,
        })
    }

    /// Run the regeneration command, if one is configured.
    pub async fn regenerate(&self) -> Result<()> {
        match &self.regenerate {
            Some(command) => command.clone().execute().await,
            None => {
                info!("Skipping regeneration command");
                Ok(())
            }
        }
    }
}

/// Options for a single bump run.
#[derive(Debug, Clone)]
pub struct BumpOptions {
    /// Release track to follow, e.g. `v1.31` or `1.24`
    pub release_track: String,
    /// Project root containing the files to patch
    pub project_root: PathBuf,
    /// Skip the regeneration command
    pub skip_regenerate: bool,
    /// Where to write the version and commit message
    pub reporter: Reporter,
}

impl BumpOptions {
    /// Options for `release_track` in the current directory, regenerating
    /// and writing no output files.
    pub fn new(release_track: impl Into<String>) -> Self {
        Self {
            release_track: release_track.into(),
            project_root: PathBuf::from("."),
            skip_regenerate: false,
            reporter: Reporter::default(),
        }
    }

    /// Set the project root.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// Skip or run the regeneration command.
    pub fn with_skip_regenerate(mut self, skip: bool) -> Self {
        self.skip_regenerate = skip;
        self
    }

    /// Set the reporter.
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }
}

/// Bump `component` according to `options`.
pub async fn bump(
    component: Component,
    config: &BumpConfig,
    options: &BumpOptions,
) -> Result<Report> {
    let context = UpdaterContext::new(component, config, options)?;
    match component {
        Component::Envoy => run(EnvoyUpdater::new(context), options).await,
        Component::Golang => run(GolangUpdater::new(context), options).await,
    }
}

/// Drive an updater through process and report.
pub async fn run<U: Updater>(mut updater: U, options: &BumpOptions) -> Result<Report> {
    let component = updater.component();

    updater
        .process(&options.release_track)
        .await
        .with_context(|| format!("Failed to process {component} update"))?;

    let report = options.reporter.report(&updater).await?;
    info!(
        component = %component,
        release_track = %options.release_track,
        version = %report.version,
        "Bump complete"
    );
    Ok(report)
}
