// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Serving error types.

use thiserror::Error;

use crate::registry::RegistryError;

/// Errors surfaced by the serving cache.
#[derive(Debug, Error)]
pub enum ServingError {
    /// No model is loaded. Expected while nothing has been promoted yet.
    #[error("Model not ready")]
    NotReady,

    #[error("Model resolution failed: {0}")]
    Resolve(#[from] RegistryError),

    #[error("Artifact decode failed: {0}")]
    Decode(String),

    #[error("Invalid features: {0}")]
    InvalidInput(String),

    #[error("Scoring failed: {0}")]
    Scoring(String),
}

impl ServingError {
    /// Returns true if the caller should treat this as a transient state
    /// (a readiness signal) rather than a fault.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotReady)
    }

    /// Returns true if the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
