//! Application layer errors.
//!
//! These errors represent failures in orchestration and at the ports, not in
//! rendering logic. Rendering errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur at the application boundary.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A template source failed to deliver a file it should hold.
    ///
    /// Note: when the *metadata* document fails to arrive, the loader
    /// swallows this and treats metadata as absent — retrieval failure is
    /// only fatal for ordinary template files.
    #[error("could not retrieve `{file_name}` from `{source_url}`: {reason}")]
    Retrieval {
        file_name: String,
        source_url: String,
        reason: String,
    },

    /// Filesystem operation failed (adapters writing rendered output).
    #[error("filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// A rendered file name tries to escape the output root.
    #[error("refusing to write outside the output root: {name}")]
    UnsafeOutputPath { name: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Retrieval { file_name, source_url, .. } => vec![
                format!("Could not read `{}` from `{}`", file_name, source_url),
                "Check that the template path exists and is readable".into(),
            ],
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::UnsafeOutputPath { .. } => vec![
                "A template produced a file name containing `..` or an absolute path".into(),
                "Fix the template's file layout or tag values".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Retrieval { .. } => ErrorCategory::NotFound,
            Self::Filesystem { .. } => ErrorCategory::Internal,
            Self::UnsafeOutputPath { .. } => ErrorCategory::Validation,
        }
    }
}
