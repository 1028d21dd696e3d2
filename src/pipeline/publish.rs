// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hand-off from a training run to the registry.
//!
//! Write the candidate as a new version, compare it with the live score and
//! promote only on strict improvement. Rejected candidates stay on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{PipelineError, TrainingFrame};
use crate::registry::{decide, ModelMetadata, PromotionDecision, RegistryError, VersionRegistry};
use crate::telemetry::record_promotion;

/// What a training run hands over.
#[derive(Debug, Clone)]
pub struct CandidateRun<'a> {
    pub artifact: &'a [u8],
    pub metric_name: &'a str,
    pub metric_value: f64,
    pub training_data_file: &'a Path,
    /// Unix seconds.
    pub trained_at: i64,
}

/// Result reported back to the training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub decision: PromotionDecision,
    pub score: f64,
    pub version: String,
}

/// Persist `run` as a new version and apply the promotion policy.
pub fn publish_candidate(
    registry: &VersionRegistry,
    run: &CandidateRun<'_>,
) -> Result<PipelineOutcome, RegistryError> {
    let version = registry.new_version_id();
    let metadata = ModelMetadata::new(
        &version,
        run.metric_name,
        run.metric_value,
        run.training_data_file,
        run.trained_at,
    );
    registry.write_version(&version, run.artifact, &metadata)?;

    let live_score = registry.read_current_score()?;
    let decision = decide(run.metric_value, live_score);
    if decision.is_promoted() {
        registry.promote(&version)?;
    }

    record_promotion(decision);
    info!(
        version = %version,
        score = run.metric_value,
        live_score = ?live_score,
        %decision,
        "promotion decision"
    );

    Ok(PipelineOutcome { decision, score: run.metric_value, version })
}

/// Full run from files on disk: validate the training CSV, read the
/// artifact, then publish. Nothing is written if the data is rejected.
pub fn publish_files(
    registry: &VersionRegistry,
    artifact_path: &Path,
    data_path: &Path,
    metric_name: &str,
    metric_value: f64,
    trained_at: i64,
) -> Result<PipelineOutcome, PipelineError> {
    let frame = TrainingFrame::from_csv_file(data_path)?;
    frame.validate()?;

    let artifact = std::fs::read(artifact_path).map_err(|e| PipelineError::Artifact {
        path: artifact_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let run = CandidateRun {
        artifact: &artifact,
        metric_name,
        metric_value,
        training_data_file: data_path,
        trained_at,
    };
    Ok(publish_candidate(registry, &run)?)
}
