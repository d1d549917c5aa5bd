//! Per-run updater state.

use crate::core::BumpError;

/// Values resolved during a single run.
///
/// Both fields start unset and are written once by the updater's resolve
/// step. Reads before that fail instead of yielding an empty string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdaterState {
    target_version: Option<String>,
    image_digest: Option<String>,
}

impl UpdaterState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the resolved version.
    pub fn set_target_version(&mut self, version: impl Into<String>) {
        self.target_version = Some(version.into());
    }

    /// The resolved version.
    ///
    /// # Errors
    ///
    /// [`BumpError::VersionNotSet`] before [`set_target_version`](Self::set_target_version).
    pub fn target_version(&self) -> Result<&str, BumpError> {
        self.target_version.as_deref().filter(|v| !v.is_empty()).ok_or(BumpError::VersionNotSet)
    }

    /// Record the resolved image digest.
    pub fn set_image_digest(&mut self, digest: impl Into<String>) {
        self.image_digest = Some(digest.into());
    }

    /// The resolved image digest.
    ///
    /// # Errors
    ///
    /// [`BumpError::DigestNotSet`] before [`set_image_digest`](Self::set_image_digest).
    pub fn image_digest(&self) -> Result<&str, BumpError> {
        self.image_digest.as_deref().filter(|d| !d.is_empty()).ok_or(BumpError::DigestNotSet)
    }
}
