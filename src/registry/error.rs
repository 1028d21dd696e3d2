// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Registry error types.
//!
//! Every failure is reported to the caller. The registry never retries.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Missing model artifacts in {0}")]
    NotFound(PathBuf),

    #[error("Corrupt metadata in {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Validation failed for version {version}: {reason}")]
    ValidationFailed { version: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt { path: path.into(), reason: reason.into() }
    }

    /// Returns true if the error means "artifacts are not there (yet)".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if the error indicates a broken deployment rather than
    /// a missing or incomplete version.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        let err = RegistryError::NotFound(PathBuf::from("/tmp/v1"));
        assert!(err.is_not_found());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_configuration_is_fatal() {
        let err = RegistryError::Configuration("version directory already exists".into());
        assert!(err.is_fatal());
        assert!(err.to_string().contains("already exists"));
    }
}
