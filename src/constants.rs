//! Global constants used throughout bump-deps.
//!
//! Default endpoints, timeouts, and environment variable names live here so
//! the configuration layer and the updaters agree on them.

use std::time::Duration;

/// GitHub releases listing for the Envoy proxy, newest first.
pub const ENVOY_RELEASES_URL: &str = "https://api.github.com/repos/envoyproxy/envoy/releases";

/// go.dev download index in JSON form, newest stable releases first.
pub const GO_RELEASES_URL: &str = "https://go.dev/dl/?mode=json";

/// Docker Hub tag lookup for the official `golang` image. The tag is appended
/// as a trailing path segment.
pub const GOLANG_IMAGE_TAGS_URL: &str =
    "https://registry.hub.docker.com/v2/repositories/library/golang/tags";

/// Image architecture whose digest is pinned in the build base image.
pub const GOLANG_IMAGE_ARCHITECTURE: &str = "amd64";

/// Request timeout for release and registry lookups (30 seconds).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the regeneration command (10 minutes).
///
/// `make generate` rebuilds CRDs and docs and is slow on cold CI runners.
pub const DEFAULT_REGENERATE_TIMEOUT: Duration = Duration::from_secs(600);

/// Overrides the Envoy releases endpoint.
pub const ENV_ENVOY_RELEASES_URL: &str = "BUMP_DEPS_ENVOY_RELEASES_URL";

/// Overrides the go.dev releases endpoint.
pub const ENV_GO_RELEASES_URL: &str = "BUMP_DEPS_GO_RELEASES_URL";

/// Overrides the Docker Hub tag endpoint.
pub const ENV_GOLANG_IMAGE_TAGS_URL: &str = "BUMP_DEPS_GOLANG_IMAGE_TAGS_URL";

/// Token sent to the GitHub API when present; avoids the anonymous rate limit
/// on shared CI runners.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// `User-Agent` sent with every request. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("bump-deps/", env!("CARGO_PKG_VERSION"));
