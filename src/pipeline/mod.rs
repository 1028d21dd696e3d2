// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Training-side collaborators: data checks and candidate publishing.

mod dataset;
mod publish;

pub use dataset::{DatasetError, TrainingFrame, REQUIRED_COLUMNS, TARGET_COLUMN};
pub use publish::{publish_candidate, publish_files, CandidateRun, PipelineOutcome};

use thiserror::Error;

use crate::registry::RegistryError;

/// Failure of a whole publish run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Training data rejected: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Failed to read artifact {path}: {reason}")]
    Artifact { path: String, reason: String },
}
