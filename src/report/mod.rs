//! Output files for downstream CI steps.
//!
//! After a successful bump the workflow that opens the pull request needs
//! two things: the resolved version (for the branch name and PR title) and
//! the commit message. Both are written verbatim, without a trailing newline,
//! to paths given on the command line.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::core::BumpError;
use crate::updater::Updater;

/// Result of a completed bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The resolved version, e.g. `v1.31.2` or `go1.24.2`
    pub version: String,
    /// The rendered commit message
    pub commit_message: String,
}

/// Writes the version and commit message to optional files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reporter {
    version_file: Option<PathBuf>,
    commit_message_file: Option<PathBuf>,
}

impl Reporter {
    /// Reporter writing to the given files; `None` skips that output.
    pub fn new(version_file: Option<PathBuf>, commit_message_file: Option<PathBuf>) -> Self {
        Self {
            version_file,
            commit_message_file,
        }
    }

    /// Collect the version and commit message from `updater` and write them.
    ///
    /// The version file is written before the commit message is rendered, so
    /// a failure rendering the message still leaves the version behind.
    ///
    /// # Errors
    ///
    /// [`BumpError::VersionNotSet`] if the updater has not resolved a
    /// version; [`BumpError::FileSystemError`] if an output cannot be written.
    pub async fn report<U: Updater>(&self, updater: &U) -> Result<Report> {
        let version = updater.release().context("Error getting latest version")?.to_string();

        if let Some(path) = &self.version_file {
            write_output(path, &version).await.context("Error writing to output version file")?;
            info!(file = %path.display(), "Wrote latest version to file");
        }

        let commit_message = updater.commit_message().context("Error getting commit message")?;

        if let Some(path) = &self.commit_message_file {
            write_output(path, &commit_message)
                .await
                .context("Error writing to commit message file")?;
            info!(file = %path.display(), "Wrote commit message to file");
        }

        Ok(Report {
            version,
            commit_message,
        })
    }
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).await.map_err(|e| BumpError::file_system("writing", path, &e))?;
    Ok(())
}
