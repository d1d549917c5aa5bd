//! Docker Hub image digest lookup.
//!
//! The Go build base image is pinned by digest as well as by tag. After the
//! toolchain version is resolved, the tag endpoint is queried for the
//! per-architecture images and the digest of the wanted architecture is kept.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use super::ReleaseClient;
use crate::core::BumpError;

/// Response of `GET <tags endpoint>/<tag>`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TagDescriptor {
    /// One entry per architecture the tag was built for
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
}

/// A single-architecture image behind a tag.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Content digest, `sha256:<64 hex>`
    pub digest: String,
    /// Architecture, e.g. `amd64`, `arm64`
    pub architecture: String,
}

impl TagDescriptor {
    /// Digest of the first image built for `architecture`.
    pub fn digest_for(&self, tag: &str, architecture: &str) -> Result<&str, BumpError> {
        self.images
            .iter()
            .find(|image| image.architecture == architecture)
            .map(|image| image.digest.as_str())
            .ok_or_else(|| BumpError::ImageNotFound {
                tag: tag.to_string(),
                architecture: architecture.to_string(),
            })
    }
}

/// Look up the digest of `tag` for `architecture` under `tags_url`.
pub async fn image_digest(
    client: &ReleaseClient,
    tags_url: &str,
    tag: &str,
    architecture: &str,
) -> Result<String> {
    let url = format!("{}/{}", tags_url.trim_end_matches('/'), tag);
    let descriptor: TagDescriptor =
        client.fetch_json(&url).await.context("Failed to get image tag")?;

    let digest = descriptor.digest_for(tag, architecture)?;
    debug!(tag, architecture, digest, "Resolved image digest");
    Ok(digest.to_string())
}
