// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Version metadata record (`metadata.json`).
//!
//! Written once next to the artifact and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::RegistryError;

/// Current metadata schema tag.
pub const METADATA_SCHEMA_VERSION: &str = "v1";
/// Feature layout the serving side expects.
pub const FEATURE_SCHEMA_VERSION: &str = "v1";

/// Named evaluation metric recorded for a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
}

/// Metadata stored alongside each version's artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub schema_version: String,
    pub model_version_id: String,
    pub metric: Metric,
    /// File name only; the directory of the training data is not recorded.
    pub training_data_file: String,
    /// Unix seconds.
    pub trained_at: i64,
    pub feature_schema_version: String,
}

impl ModelMetadata {
    /// Build metadata for a freshly trained version.
    pub fn new(
        model_version_id: &str,
        metric_name: &str,
        metric_value: f64,
        training_data_file: &Path,
        trained_at: i64,
    ) -> Self {
        let file_name = training_data_file
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Self {
            schema_version: METADATA_SCHEMA_VERSION.to_string(),
            model_version_id: model_version_id.to_string(),
            metric: Metric { name: metric_name.to_string(), value: metric_value },
            training_data_file: file_name,
            trained_at,
            feature_schema_version: FEATURE_SCHEMA_VERSION.to_string(),
        }
    }

    /// Load metadata from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(RegistryError::io(path, e)),
        };
        Self::from_json(&content).map_err(|reason| RegistryError::corrupt(path, reason))
    }

    /// Parse metadata from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let meta: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        meta.validate()?;
        Ok(meta)
    }

    /// Serialize as pretty JSON, the format written to disk.
    pub fn to_json(&self) -> Result<String, RegistryError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RegistryError::Configuration(format!("unserializable metadata: {}", e)))
    }

    /// Validate fields that serde cannot check.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version_id.is_empty() {
            return Err("model_version_id cannot be empty".into());
        }
        if self.metric.name.is_empty() {
            return Err("metric.name cannot be empty".into());
        }
        if !self.metric.value.is_finite() {
            return Err("metric.value must be finite".into());
        }
        Ok(())
    }

    /// The value used by the promotion policy.
    pub fn score(&self) -> f64 {
        self.metric.value
    }
}
