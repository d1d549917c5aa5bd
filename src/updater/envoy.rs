//! Envoy proxy image bumps.
//!
//! Resolves the newest Envoy release on a track (e.g. `v1.31`) from the
//! GitHub releases API and rewrites every `docker.io/envoyproxy/envoy:vX.Y.Z`
//! reference in the project, then runs `make generate` so rendered manifests
//! pick up the new image.

use anyhow::{Context, Result};
use tracing::info;

use super::{Component, Updater, UpdaterContext, UpdaterState};
use crate::core::BumpError;
use crate::patch::{self, FilePatcher, PatchSummary, Substitution};
use crate::release::GithubRelease;

/// Files that reference the Envoy image, relative to the project root.
pub const FILES: [&str; 4] = [
    "Makefile",
    "cmd/contour/gatewayprovisioner.go",
    "examples/contour/03-envoy.yaml",
    "examples/deployment/03-envoy-deployment.yaml",
];

/// Image reference pinned to a release tag.
pub const IMAGE_PATTERN: &str = r"docker\.io/envoyproxy/envoy:v[0-9]+\.[0-9]+\.[0-9]+";

const IMAGE_REPOSITORY: &str = "docker.io/envoyproxy/envoy";

/// Substitutions rewriting the image reference to `tag`.
pub fn substitutions(tag: &str) -> Result<Vec<Substitution>> {
    Ok(vec![Substitution::new(
        IMAGE_PATTERN,
        format!("{IMAGE_REPOSITORY}:{}", patch::literal(tag)),
    )?])
}

/// Reject tags the image pattern could not match again.
pub fn ensure_tag(tag: &str) -> Result<(), BumpError> {
    let version = tag.strip_prefix('v').ok_or_else(|| BumpError::InvalidVersion {
        version: tag.to_string(),
        reason: "Envoy tags start with 'v'".to_string(),
    })?;
    patch::ensure_release_version(version).map(|_| ())
}

/// Updater for the Envoy proxy.
#[derive(Debug)]
pub struct EnvoyUpdater {
    context: UpdaterContext,
    state: UpdaterState,
}

impl EnvoyUpdater {
    /// New updater with nothing resolved yet.
    pub fn new(context: UpdaterContext) -> Self {
        Self {
            context,
            state: UpdaterState::new(),
        }
    }

    /// Resolve the newest release tag on `release_track`.
    pub async fn resolve(&mut self, release_track: &str) -> Result<()> {
        let endpoint = &self.context.endpoints.envoy_releases;
        let tag = self
            .context
            .client
            .latest_release::<GithubRelease>(endpoint, "", release_track)
            .await?;
        ensure_tag(&tag)?;

        info!(component = "envoy", release_track, version = %tag, "Latest version");
        self.state.set_target_version(tag);
        Ok(())
    }

    /// Rewrite the image reference in every project file.
    pub async fn patch(&self) -> Result<PatchSummary> {
        let tag = self.state.target_version()?;
        FilePatcher::new(&self.context.project_root, FILES).apply(&substitutions(tag)?).await
    }
}

impl Updater for EnvoyUpdater {
    fn component(&self) -> Component {
        Component::Envoy
    }

    async fn process(&mut self, release_track: &str) -> Result<()> {
        self.resolve(release_track).await.context("Error getting latest version")?;

        let summary = self.patch().await.context("Error updating code")?;
        info!(
            changed = summary.changed.len(),
            unchanged = summary.unchanged.len(),
            "Patched Envoy image references"
        );

        self.context.regenerate().await.context("Error regenerating files")
    }

    fn release(&self) -> Result<&str, BumpError> {
        self.state.target_version()
    }

    fn commit_message(&self) -> Result<String, BumpError> {
        let tag = self.state.target_version()?;
        Ok(format!(
            "Automated bump for Envoy {tag}.\n\nSee the release notes: https://github.com/envoyproxy/envoy/releases/tag/{tag}"
        ))
    }
}
