//! Configuration for bump-deps runs.
//!
//! Every setting has a built-in default matching the upstream services the
//! tool was written for, so a run needs no configuration file at all. A TOML
//! file passed with `--config` may override any subset of fields, and a small
//! set of environment variables is applied on top of that (CI jobs point the
//! endpoints at mirrors this way).
//!
//! # Resolution Order
//!
//! 1. Built-in defaults ([`BumpConfig::default`])
//! 2. TOML file from `--config`, if given
//! 3. `BUMP_DEPS_*_URL` and `GITHUB_TOKEN` environment variables
//!
//! # File Format
//!
//! ```toml
//! [endpoints]
//! envoy_releases = "https://api.github.com/repos/envoyproxy/envoy/releases"
//! go_releases = "https://go.dev/dl/?mode=json"
//! golang_image_tags = "https://registry.hub.docker.com/v2/repositories/library/golang/tags"
//!
//! [http]
//! timeout_secs = 30
//!
//! [regenerate]
//! timeout_secs = 600
//! envoy = ["make", "generate"]
//! golang = ["go", "mod", "tidy"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use crate::constants;
use crate::core::BumpError;
use crate::updater::Component;

/// Top-level configuration for a bump run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BumpConfig {
    /// Upstream API endpoints.
    pub endpoints: EndpointConfig,
    /// HTTP client settings.
    pub http: HttpConfig,
    /// Regeneration commands run after patching.
    pub regenerate: RegenerateConfig,
    /// Bearer token for the GitHub API. Only ever read from the environment.
    #[serde(skip)]
    pub github_token: Option<String>,
}

/// Release and registry endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    /// GitHub releases listing for Envoy.
    pub envoy_releases: String,
    /// go.dev JSON download index.
    pub go_releases: String,
    /// Docker Hub tag endpoint for the `golang` image, without the tag.
    pub golang_image_tags: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            envoy_releases: constants::ENVOY_RELEASES_URL.to_string(),
            go_releases: constants::GO_RELEASES_URL.to_string(),
            golang_image_tags: constants::GOLANG_IMAGE_TAGS_URL.to_string(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

impl HttpConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Regeneration command per component.
///
/// Each command is an argv list; the first element is the program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegenerateConfig {
    /// Timeout for the regeneration command in seconds.
    pub timeout_secs: u64,
    /// Command run after an Envoy bump.
    pub envoy: Vec<String>,
    /// Command run after a Go bump.
    pub golang: Vec<String>,
}

impl Default for RegenerateConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_REGENERATE_TIMEOUT.as_secs(),
            envoy: vec!["make".to_string(), "generate".to_string()],
            golang: vec!["go".to_string(), "mod".to_string(), "tidy".to_string()],
        }
    }
}

impl RegenerateConfig {
    /// Regeneration timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The argv for a component's regeneration command.
    pub fn command_for(&self, component: Component) -> &[String] {
        match component {
            Component::Envoy => &self.envoy,
            Component::Golang => &self.golang,
        }
    }
}

impl BumpConfig {
    /// Load configuration from an optional file, then apply environment
    /// overrides.
    ///
    /// A missing `path` means defaults. A path that is given but cannot be
    /// read is an error, unlike an absent default file.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path).await?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file without applying
    /// environment overrides.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `BUMP_DEPS_*` endpoint overrides and `GITHUB_TOKEN`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(constants::ENV_ENVOY_RELEASES_URL) {
            debug!(url = %url, "Overriding Envoy releases endpoint");
            self.endpoints.envoy_releases = url;
        }
        if let Some(url) = non_empty(constants::ENV_GO_RELEASES_URL) {
            debug!(url = %url, "Overriding Go releases endpoint");
            self.endpoints.go_releases = url;
        }
        if let Some(url) = non_empty(constants::ENV_GOLANG_IMAGE_TAGS_URL) {
            debug!(url = %url, "Overriding golang image tags endpoint");
            self.endpoints.golang_image_tags = url;
        }
        if let Some(token) = non_empty(constants::ENV_GITHUB_TOKEN) {
            self.github_token = Some(token);
        }
    }

    /// Reject settings that would only fail later in the run.
    pub fn validate(&self) -> Result<()> {
        for component in [Component::Envoy, Component::Golang] {
            if self.regenerate.command_for(component).is_empty() {
                return Err(BumpError::ConfigError {
                    message: format!("regenerate.{component} must name a program"),
                }
                .into());
            }
        }
        for (key, value) in [
            ("http.timeout_secs", self.http.timeout_secs),
            ("regenerate.timeout_secs", self.regenerate.timeout_secs),
        ] {
            if value == 0 {
                return Err(BumpError::ConfigError {
                    message: format!("{key} must be greater than zero"),
                }
                .into());
            }
        }
        Ok(())
    }
}
