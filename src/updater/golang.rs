//! Go toolchain bumps.
//!
//! Resolves the newest Go release on a track (e.g. `1.24`) from the go.dev
//! download index, looks up the digest of the matching `golang` image on
//! Docker Hub, and rewrites two tokens across the Makefile and CI workflows:
//!
//! - `BUILD_BASE_IMAGE ?= golang:X.Y.Z@sha256:<digest>` (version and digest)
//! - `GO_VERSION: X.Y.Z`
//!
//! `go mod tidy` runs afterwards so `go.mod`'s toolchain line follows.

use anyhow::{Context, Result};
use tracing::info;

use super::{Component, Updater, UpdaterContext, UpdaterState};
use crate::constants;
use crate::core::BumpError;
use crate::patch::{self, FilePatcher, PatchSummary, Substitution};
use crate::release::{GoRelease, docker_hub};

/// Files carrying the Go version, relative to the project root.
pub const FILES: [&str; 5] = [
    "Makefile",
    ".github/workflows/build_daily.yaml",
    ".github/workflows/build_tag.yaml",
    ".github/workflows/codeql-analysis.yml",
    ".github/workflows/prbuild.yaml",
];

/// Build base image pinned by version and digest.
pub const BASE_IMAGE_PATTERN: &str =
    r"(BUILD_BASE_IMAGE\s*\?=\s*golang:)[0-9]+\.[0-9]+\.[0-9]+@sha256:[a-f0-9]{64}";

/// Go version variable in CI workflows.
pub const GO_VERSION_PATTERN: &str = r"(GO_VERSION:\s*)[0-9]+\.[0-9]+\.[0-9]+";

/// Prefix go.dev puts in front of every version.
const TAG_PREFIX: &str = "go";

/// Substitutions for toolchain `version` (without the `go` prefix) and image
/// `digest`.
pub fn substitutions(version: &str, digest: &str) -> Result<Vec<Substitution>> {
    let version = patch::literal(version);
    Ok(vec![
        Substitution::new(
            BASE_IMAGE_PATTERN,
            format!("${{1}}{version}@{}", patch::literal(digest)),
        )?,
        Substitution::new(GO_VERSION_PATTERN, format!("${{1}}{version}"))?,
    ])
}

/// Reject digests the base image pattern could not match again.
pub fn ensure_digest(tag: &str, digest: &str) -> Result<(), BumpError> {
    let valid = digest.strip_prefix("sha256:").is_some_and(|hex| {
        hex.len() == 64 && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    });
    if valid {
        Ok(())
    } else {
        Err(BumpError::InvalidDigest {
            tag: tag.to_string(),
            digest: digest.to_string(),
        })
    }
}

/// Updater for the Go toolchain.
#[derive(Debug)]
pub struct GolangUpdater {
    context: UpdaterContext,
    state: UpdaterState,
}

impl GolangUpdater {
    /// New updater with nothing resolved yet.
    pub fn new(context: UpdaterContext) -> Self {
        Self {
            context,
            state: UpdaterState::new(),
        }
    }

    /// Version without the `go` prefix, as used in image tags and files.
    fn bare_version(&self) -> Result<&str, BumpError> {
        let version = self.state.target_version()?;
        Ok(version.strip_prefix(TAG_PREFIX).unwrap_or(version))
    }

    /// Resolve the newest release on `release_track`.
    pub async fn resolve(&mut self, release_track: &str) -> Result<()> {
        let endpoint = &self.context.endpoints.go_releases;
        let version = self
            .context
            .client
            .latest_release::<GoRelease>(endpoint, TAG_PREFIX, release_track)
            .await?;
        let bare = version.strip_prefix(TAG_PREFIX).unwrap_or(&version);
        patch::ensure_release_version(bare)?;

        info!(component = "golang", release_track, version = %version, "Latest version");
        self.state.set_target_version(version);
        Ok(())
    }

    /// Look up the digest of the `golang:<version>` image.
    pub async fn resolve_image_digest(&mut self) -> Result<()> {
        let tag = self.bare_version()?.to_string();
        let digest = docker_hub::image_digest(
            &self.context.client,
            &self.context.endpoints.golang_image_tags,
            &tag,
            constants::GOLANG_IMAGE_ARCHITECTURE,
        )
        .await?;
        ensure_digest(&tag, &digest)?;

        info!(image_hash = %digest, "Golang image hash");
        self.state.set_image_digest(digest);
        Ok(())
    }

    /// Rewrite the version tokens in every project file.
    pub async fn patch(&self) -> Result<PatchSummary> {
        let version = self.bare_version()?;
        let digest = self.state.image_digest()?;
        FilePatcher::new(&self.context.project_root, FILES)
            .apply(&substitutions(version, digest)?)
            .await
    }
}

impl Updater for GolangUpdater {
    fn component(&self) -> Component {
        Component::Golang
    }

    async fn process(&mut self, release_track: &str) -> Result<()> {
        self.resolve(release_track).await.context("Error getting latest version")?;
        self.resolve_image_digest().await.context("Error getting image hash")?;

        let summary = self.patch().await.context("Error updating code")?;
        info!(
            changed = summary.changed.len(),
            unchanged = summary.unchanged.len(),
            "Patched Go version references"
        );

        self.context.regenerate().await.context("Error regenerating files")
    }

    fn release(&self) -> Result<&str, BumpError> {
        self.state.target_version()
    }

    fn commit_message(&self) -> Result<String, BumpError> {
        let version = self.state.target_version()?;
        Ok(format!(
            "Automated bump for Go {version}.\n\nSee the release notes: https://go.dev/doc/devel/release#{version}"
        ))
    }
}
