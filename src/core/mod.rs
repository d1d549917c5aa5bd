//! Core types for bump-deps
//!
//! Holds the error system shared by every stage of a bump run:
//! - [`BumpError`] - enumerated failure modes
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] for display

pub mod error;

pub use error::{BumpError, ErrorContext, user_friendly_error};
