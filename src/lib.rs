//! bump-deps: keep pinned upstream versions current.
//!
//! A CI job runs this crate against a project checkout on a schedule. For a
//! given component and release track it:
//!
//! 1. asks the upstream release index for the newest stable version on the
//!    track ([`release`])
//! 2. rewrites every pinned reference in the project's files ([`patch`])
//! 3. runs the component's regeneration command ([`patch::regenerate`])
//! 4. writes the version and a commit message for the pull-request step
//!    ([`report`])
//!
//! Supported components are listed in [`updater::Component`]:
//!
//! | Component | Release index | Pinned in |
//! |-----------|---------------|-----------|
//! | `envoy` | GitHub releases of `envoyproxy/envoy` | image references in the Makefile, Go code and example manifests |
//! | `golang` | `go.dev/dl` JSON index plus the Docker Hub `golang` image digest | Makefile base image and CI workflow `GO_VERSION` |
//!
//! # Modules
//!
//! - [`cli`] - clap definitions for the `bump-deps` and `bump-envoy` binaries
//! - [`config`] - TOML configuration and environment overrides
//! - [`constants`] - default endpoints and timeouts
//! - [`core`] - error types and user-facing error rendering
//! - [`patch`] - regex substitutions over a fixed file list, plus the
//!   regeneration subprocess
//! - [`release`] - release index clients and track matching
//! - [`report`] - version and commit-message output files
//! - [`updater`] - the per-component updaters and the bump pipeline
//!
//! # Example
//!
//! ```bash
//! bump-deps envoy --release-track v1.31 --output-version-file version.txt
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod patch;
pub mod release;
pub mod report;
pub mod updater;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
