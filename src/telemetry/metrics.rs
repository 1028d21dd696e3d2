// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metric names and recording helpers over the `metrics` facade.
//!
//! Without an installed recorder these calls are no-ops.

use crate::registry::PromotionDecision;

/// Outcome label for `serving_reloads_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Loaded,
    Empty,
    Failed,
}

impl ReloadOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Empty => "empty",
            Self::Failed => "failed",
        }
    }
}

pub fn record_promotion(decision: PromotionDecision) {
    let label = match decision {
        PromotionDecision::Promoted => "promoted",
        PromotionDecision::Rejected => "rejected",
    };
    metrics::counter!("registry_promotions_total", "decision" => label).increment(1);
}

pub fn record_version_written() {
    metrics::counter!("registry_versions_written_total").increment(1);
}

pub fn record_reload(outcome: ReloadOutcome) {
    metrics::counter!("serving_reloads_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_prediction(label: u8) {
    let label = if label == 1 { "1" } else { "0" };
    metrics::counter!("serving_predictions_total", "label" => label).increment(1);
}

pub fn set_ready(ready: bool) {
    metrics::gauge!("serving_ready").set(if ready { 1.0 } else { 0.0 });
}
