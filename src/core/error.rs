//! Error handling for bump-deps
//!
//! Two layers, in the same shape used across the CLI:
//! 1. [`BumpError`] - strongly-typed failures raised by the fetch, patch and
//!    report stages
//! 2. [`ErrorContext`] - a wrapper adding a details line and an actionable
//!    suggestion for display on the terminal
//!
//! Call sites return [`anyhow::Result`] and attach context with
//! `.context()` / `.with_context()`. At the top of the process
//! [`user_friendly_error`] digs the [`BumpError`] back out of the chain (if
//! there is one) and renders it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bump_deps::core::{BumpError, user_friendly_error};
//!
//! let error = anyhow::Error::from(BumpError::VersionNotSet);
//! user_friendly_error(error).display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bump-deps operations.
///
/// Every variant owns plain data so the error can be cloned out of an
/// [`anyhow::Error`] chain when building an [`ErrorContext`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BumpError {
    /// The release or registry API answered with a non-success status.
    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Numeric HTTP status code
        status: u16,
    },

    /// No release in the upstream listing belongs to the requested track.
    #[error("No matching release found for track: {track}")]
    NoMatchingRelease {
        /// The release track that was searched for
        track: String,
    },

    /// The image registry has no usable image for the tag.
    #[error("No {architecture} image found for tag: {tag}")]
    ImageNotFound {
        /// Image tag that was looked up
        tag: String,
        /// Architecture that was required
        architecture: String,
    },

    /// The registry returned a digest that is not `sha256:<64 hex>`.
    #[error("Image digest '{digest}' for tag {tag} is not a sha256 digest")]
    InvalidDigest {
        /// Image tag that was looked up
        tag: String,
        /// The digest as returned
        digest: String,
    },

    /// The target version was read before it was resolved.
    #[error("Target version not set")]
    VersionNotSet,

    /// The image digest was read before it was resolved.
    #[error("Image digest not set")]
    DigestNotSet,

    /// A resolved version is not a strict `MAJOR.MINOR.PATCH` token.
    #[error("Resolved version '{version}' is not a MAJOR.MINOR.PATCH release: {reason}")]
    InvalidVersion {
        /// The offending version string
        version: String,
        /// Why it was rejected
        reason: String,
    },

    /// The regeneration program is not on `PATH`.
    #[error("Command '{program}' not found in PATH")]
    CommandNotFound {
        /// Program name
        program: String,
    },

    /// The regeneration command exited unsuccessfully.
    #[error("Command '{command}' failed with {status}")]
    CommandFailed {
        /// Full command line
        command: String,
        /// Exit status description
        status: String,
    },

    /// The regeneration command did not finish in time.
    #[error("Command '{command}' timed out after {seconds} seconds")]
    CommandTimedOut {
        /// Full command line
        command: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// Reading or writing a project or output file failed.
    #[error("File system error while {operation}: {}", .path.display())]
    FileSystemError {
        /// What was being done (e.g. "reading", "writing")
        operation: String,
        /// The file involved
        path: PathBuf,
        /// Underlying I/O error message
        reason: String,
    },

    /// The configuration file or an override is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Anything else, already formatted for display.
    #[error("{message}")]
    Other {
        /// Preformatted message including the cause chain
        message: String,
    },
}

impl BumpError {
    /// Build a [`BumpError::FileSystemError`] from an I/O error.
    pub fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: &std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.into(),
            reason: source.to_string(),
        }
    }
}

/// Error wrapper with user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BumpError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: BumpError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow,
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a displayable [`ErrorContext`].
///
/// A [`BumpError`] anywhere in the chain gets a tailored suggestion, with the
/// outermost context message kept as the details line. TOML errors point at
/// the config file. Everything else is rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bump_error) = error.downcast_ref::<BumpError>() {
        let mut ctx = create_error_context(bump_error.clone());
        let outer = error.to_string();
        if outer != bump_error.to_string() {
            ctx.details = Some(match ctx.details.take() {
                Some(existing) => format!("{outer}\n{existing}"),
                None => outer,
            });
        }
        return ctx;
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(BumpError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of the file passed with --config");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(BumpError::Other {
        message,
    })
}

fn create_error_context(error: BumpError) -> ErrorContext {
    match &error {
        BumpError::HttpStatus { status, .. } => {
            let suggestion = match status {
                403 | 429 => "The API is rate limiting this client. Export GITHUB_TOKEN or retry later",
                404 => "Check the endpoint override in --config or the BUMP_DEPS_* environment variables",
                _ => "Retry the run; the upstream service may be degraded",
            };
            ErrorContext::new(error.clone()).with_suggestion(suggestion)
        }

        BumpError::NoMatchingRelease { track } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check that '{track}' is a published release track, e.g. 'v1.31' for Envoy or '1.24' for Go"
            ))
            .with_details("Only the releases returned by the first page of the upstream API are considered"),

        BumpError::ImageNotFound { tag, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "The golang:{tag} image may not be published yet; rerun once Docker Hub has it"
            )),

        BumpError::InvalidDigest { .. } => ErrorContext::new(error.clone())
            .with_details("Only sha256 digests can be pinned in the build base image"),

        BumpError::VersionNotSet | BumpError::DigestNotSet => ErrorContext::new(error.clone())
            .with_details("The release was never resolved; this is a bug in the updater sequence"),

        BumpError::InvalidVersion { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Pick a release track that only contains final MAJOR.MINOR.PATCH releases"),

        BumpError::CommandNotFound { program } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Install '{program}' or rerun with --skip-regenerate and regenerate manually"
            )),

        BumpError::CommandFailed { .. } | BumpError::CommandTimedOut { .. } => {
            ErrorContext::new(error.clone())
                .with_details("Project files were already patched and are left modified")
        }

        BumpError::FileSystemError { reason, .. } => {
            ErrorContext::new(error.clone())
                .with_details(reason.clone())
                .with_suggestion("Run from the project root or pass --project-root")
        }

        BumpError::ConfigError { .. } | BumpError::Other { .. } => ErrorContext::new(error.clone()),
    }
}
