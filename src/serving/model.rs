// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model capability seam.
//!
//! The registry never interprets artifacts. Serving only needs "feature
//! vector in, positive-class probability out", supplied by an
//! `ArtifactDecoder` that turns the artifact bytes into a `Scorer`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::ServingError;

/// Positive-class threshold: `label = 1` iff `probability >= 0.5`.
pub const POSITIVE_THRESHOLD: f64 = 0.5;

/// A loaded binary classifier.
pub trait Scorer: Send + Sync {
    /// Probability of the positive class, in `[0, 1]`.
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ServingError>;

    /// Expected feature count, if the model knows it.
    fn n_features(&self) -> Option<usize> {
        None
    }
}

/// Turns artifact bytes into a ready-to-score model.
pub trait ArtifactDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn Scorer>, ServingError>;
}

/// Binary prediction returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: u8,
    pub probability: f64,
}

impl Prediction {
    /// Apply the fixed threshold to a positive-class probability.
    pub fn from_probability(probability: f64) -> Self {
        let label = if probability >= POSITIVE_THRESHOLD { 1 } else { 0 };
        Self { label, probability }
    }
}

/// Standardized logistic regression: features are scaled with per-column
/// mean and scale, then passed through a linear layer and a sigmoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    fn validate(&self) -> Result<(), ServingError> {
        let n = self.weights.len();
        if n == 0 {
            return Err(ServingError::Decode("model has no weights".into()));
        }
        if self.means.len() != n || self.scales.len() != n {
            return Err(ServingError::Decode(format!(
                "shape mismatch: {} weights, {} means, {} scales",
                n,
                self.means.len(),
                self.scales.len()
            )));
        }
        let all_finite = self
            .means
            .iter()
            .chain(&self.scales)
            .chain(&self.weights)
            .chain(std::iter::once(&self.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ServingError::Decode("non-finite parameter".into()));
        }
        Ok(())
    }
}

impl Scorer for LogisticModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ServingError> {
        if features.len() != self.weights.len() {
            return Err(ServingError::InvalidInput(format!(
                "expected {} features, got {}",
                self.weights.len(),
                features.len()
            )));
        }
        if features.iter().any(|x| !x.is_finite()) {
            return Err(ServingError::InvalidInput("features must be finite".into()));
        }

        let z = features
            .iter()
            .zip(&self.means)
            .zip(&self.scales)
            .zip(&self.weights)
            .fold(self.intercept, |acc, (((x, mean), scale), w)| {
                // Zero-variance columns are left unscaled.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                acc + w * (x - mean) / scale
            });

        Ok(sigmoid(z))
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Decodes `LogisticModel` artifacts stored as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogisticDecoder;

impl ArtifactDecoder for JsonLogisticDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn Scorer>, ServingError> {
        let model: LogisticModel =
            serde_json::from_slice(bytes).map_err(|e| ServingError::Decode(e.to_string()))?;
        model.validate()?;
        Ok(Arc::new(model))
    }
}
