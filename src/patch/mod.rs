//! In-place version substitution over a fixed file list.
//!
//! Each component owns a list of project files and one or more regex
//! [`Substitution`]s. [`FilePatcher::apply`] reads every file, runs the
//! substitutions in order and writes the file back when its content changed.
//! Files are processed in list order and the first failure stops the run;
//! files patched before the failure stay patched.
//!
//! Patterns only ever match strict `MAJOR.MINOR.PATCH` tokens, and
//! [`ensure_release_version`] rejects anything else before it can be
//! written. A patched file therefore matches its own pattern again, and
//! patching twice with the same version is a no-op.
//!
//! # Modules
//!
//! - [`regenerate`] - runs the project's regeneration command after patching

pub mod regenerate;

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::core::BumpError;

/// A compiled pattern and its replacement template.
///
/// The template uses `regex` expansion syntax (`${1}` for the first group).
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    /// Compile `pattern` with the given replacement template.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("Invalid substitution pattern: {pattern}"))?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
        })
    }

    /// Apply to `content`, returning the rewritten text.
    pub fn apply(&self, content: &str) -> String {
        self.pattern.replace_all(content, self.replacement.as_str()).into_owned()
    }
}

/// Escape `$` so literal text survives `regex` replacement expansion.
pub fn literal(text: &str) -> String {
    text.replace('$', "$$")
}

/// Check that `version` is a final `MAJOR.MINOR.PATCH` release.
///
/// Pre-release and build-metadata suffixes are rejected because the patch
/// patterns would not match them on the next run.
pub fn ensure_release_version(version: &str) -> Result<semver::Version, BumpError> {
    let parsed = semver::Version::parse(version).map_err(|e| BumpError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })?;

    if !parsed.pre.is_empty() || !parsed.build.is_empty() {
        return Err(BumpError::InvalidVersion {
            version: version.to_string(),
            reason: "pre-release and build suffixes are not supported".to_string(),
        });
    }
    Ok(parsed)
}

/// Outcome of a patch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchSummary {
    /// Files whose content changed and were written back
    pub changed: Vec<PathBuf>,
    /// Files that already carried the target version
    pub unchanged: Vec<PathBuf>,
}

/// Applies substitutions to a fixed list of files under a project root.
#[derive(Debug, Clone)]
pub struct FilePatcher {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl FilePatcher {
    /// Patcher over `files`, each relative to `root`.
    pub fn new<I, P>(root: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            root: root.into(),
            files: files.into_iter().map(|f| f.as_ref().to_path_buf()).collect(),
        }
    }

    /// The project root files are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rewrite every file with `substitutions`, in list order.
    ///
    /// # Errors
    ///
    /// [`BumpError::FileSystemError`] for the first file that cannot be read
    /// or written. Earlier files are not restored.
    pub async fn apply(&self, substitutions: &[Substitution]) -> Result<PatchSummary> {
        let mut summary = PatchSummary::default();

        for relative in &self.files {
            let path = self.root.join(relative);

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| BumpError::file_system("reading", &path, &e))
                .with_context(|| format!("Failed to read file {}", relative.display()))?;

            let patched = substitutions.iter().fold(content.clone(), |text, s| s.apply(&text));

            if patched == content {
                debug!(file = %relative.display(), "Already up to date");
                summary.unchanged.push(relative.clone());
                continue;
            }

            fs::write(&path, patched)
                .await
                .map_err(|e| BumpError::file_system("writing", &path, &e))
                .with_context(|| format!("Failed to write file {}", relative.display()))?;

            info!(file = %relative.display(), "Patched");
            summary.changed.push(relative.clone());
        }

        Ok(summary)
    }
}
