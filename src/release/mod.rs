//! Release lookup against upstream APIs.
//!
//! A bump starts by asking an upstream service which releases exist and
//! picking the newest one on the requested release track. Both supported
//! services return a JSON array ordered newest first, so "newest on the
//! track" is simply the first entry that belongs to it.
//!
//! # Release Tracks
//!
//! A track is a version prefix such as `v1.31` (Envoy) or `1.24` (Go). A
//! version belongs to the track when, after stripping the component's tag
//! prefix, it starts with the track and the next character is either the end
//! of the string or a `.`:
//!
//! | track   | version     | matches |
//! |---------|-------------|---------|
//! | `v1.31` | `v1.31.0`   | yes     |
//! | `v1.31` | `v1.310.0`  | no      |
//! | `1.24`  | `go1.24.2`  | yes     |
//! | `1.24`  | `go1.24rc1` | no      |
//!
//! # Modules
//!
//! - [`docker_hub`] - image digest lookup for the Go build base image

pub mod docker_hub;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::BumpConfig;
use crate::constants;
use crate::core::BumpError;

/// A single entry of an upstream release listing.
pub trait ReleaseDescriptor {
    /// The version or tag string of this release (e.g. `v1.31.0`, `go1.24.2`).
    fn version(&self) -> &str;

    /// Whether the release may be selected. Listings without a stability
    /// marker treat every entry as stable.
    fn is_stable(&self) -> bool {
        true
    }
}

/// Entry of the GitHub releases API. Only the tag is needed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubRelease {
    /// Git tag of the release, e.g. `v1.31.2`
    pub tag_name: String,
}

impl ReleaseDescriptor for GithubRelease {
    fn version(&self) -> &str {
        &self.tag_name
    }
}

/// Entry of the go.dev download index.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GoRelease {
    /// Toolchain version with its `go` prefix, e.g. `go1.24.2`
    pub version: String,
    /// Whether go.dev lists this as a stable release
    #[serde(default)]
    pub stable: bool,
}

impl ReleaseDescriptor for GoRelease {
    fn version(&self) -> &str {
        &self.version
    }

    fn is_stable(&self) -> bool {
        self.stable
    }
}

/// Whether `version` belongs to `track` once `tag_prefix` is stripped.
pub fn matches_track(version: &str, tag_prefix: &str, track: &str) -> bool {
    version
        .strip_prefix(tag_prefix)
        .and_then(|rest| rest.strip_prefix(track))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Pick the first stable release on `track`, preserving upstream order.
///
/// # Errors
///
/// [`BumpError::NoMatchingRelease`] when no entry belongs to the track.
pub fn select_release<'a, R: ReleaseDescriptor>(
    releases: &'a [R],
    tag_prefix: &str,
    track: &str,
) -> Result<&'a R, BumpError> {
    releases
        .iter()
        .inspect(|release| trace!(version = release.version(), "Considering release"))
        .filter(|release| release.is_stable())
        .find(|release| matches_track(release.version(), tag_prefix, track))
        .ok_or_else(|| BumpError::NoMatchingRelease {
            track: track.to_string(),
        })
}

/// HTTP client for release and registry lookups.
///
/// Every request carries the crate's `User-Agent` and the configured timeout.
/// When a GitHub token is configured it is sent only to `api.github.com`, so
/// endpoint overrides pointing elsewhere never see it.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    github_token: Option<String>,
}

impl ReleaseClient {
    /// Build a client from the run configuration.
    pub fn new(config: &BumpConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(constants::USER_AGENT)
            .timeout(config.http.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            github_token: config.github_token.clone(),
        })
    }

    /// GET `url` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Fails on transport errors (including timeouts), on a non-success
    /// status ([`BumpError::HttpStatus`]), and when the body does not decode
    /// into `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "Fetching");

        let mut request = self.http.get(url);
        if let Some(token) =
            self.github_token.as_deref().filter(|_| url.starts_with("https://api.github.com/"))
        {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.with_context(|| format!("Failed to get {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BumpError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {url}"))
    }

    /// Fetch a release listing and return the newest version on `track`.
    pub async fn latest_release<R>(
        &self,
        url: &str,
        tag_prefix: &str,
        track: &str,
    ) -> Result<String>
    where
        R: DeserializeOwned + ReleaseDescriptor,
    {
        let releases: Vec<R> = self.fetch_json(url).await.context("Failed to get releases")?;
        debug!(count = releases.len(), track, "Fetched release listing");

        let release = select_release(&releases, tag_prefix, track)?;
        Ok(release.version().to_string())
    }
}
