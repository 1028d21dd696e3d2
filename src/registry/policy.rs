// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Promotion policy.
//!
//! The policy is evaluated by the caller; `VersionRegistry::promote` does
//! not enforce it. A candidate replaces the live version only when its score
//! is strictly greater, so equal-quality retrains do not churn the pointer.

use serde::{Deserialize, Serialize};

/// Outcome of a promotion decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PromotionDecision {
    Promoted,
    Rejected,
}

impl PromotionDecision {
    pub fn is_promoted(self) -> bool {
        self == Self::Promoted
    }
}

impl std::fmt::Display for PromotionDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Promoted => write!(f, "PROMOTED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Decide whether a candidate should go live.
///
/// No live score means the candidate always wins. Non-finite candidate
/// scores never win.
pub fn decide(candidate: f64, current: Option<f64>) -> PromotionDecision {
    if !candidate.is_finite() {
        return PromotionDecision::Rejected;
    }
    match current {
        None => PromotionDecision::Promoted,
        Some(live) if candidate > live => PromotionDecision::Promoted,
        Some(_) => PromotionDecision::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_version_always_promotes() {
        assert_eq!(decide(0.0, None), PromotionDecision::Promoted);
    }

    #[test]
    fn test_strictly_greater_promotes() {
        assert_eq!(decide(0.95, Some(0.9)), PromotionDecision::Promoted);
    }

    #[test]
    fn test_tie_is_rejected() {
        assert_eq!(decide(0.9, Some(0.9)), PromotionDecision::Rejected);
    }

    #[test]
    fn test_lower_is_rejected() {
        assert_eq!(decide(0.4, Some(0.9)), PromotionDecision::Rejected);
    }

    #[test]
    fn test_nan_candidate_is_rejected() {
        assert_eq!(decide(f64::NAN, None), PromotionDecision::Rejected);
    }

    #[test]
    fn test_decision_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&PromotionDecision::Promoted).unwrap(), "\"PROMOTED\"");
        assert_eq!(PromotionDecision::Rejected.to_string(), "REJECTED");
    }
}
