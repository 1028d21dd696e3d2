// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Transport-agnostic request handlers.
//!
//! Each handler returns an [`ApiResponse`] carrying an HTTP-style status and
//! a JSON body, so an embedding service can mount them on whatever server
//! it runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::health::HealthChecker;
use crate::serving::{ServingCache, ServingError};

/// Status code and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn detail(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "detail": detail.into() }),
        }
    }
}

/// Feature vector for one prediction, in model input order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictRequest {
    pub age: f64,
    pub income: f64,
    pub account_balance: f64,
    pub transactions_last_30d: f64,
    pub is_premium: f64,
}

impl PredictRequest {
    pub const FEATURE_NAMES: [&'static str; 5] = [
        "age",
        "income",
        "account_balance",
        "transactions_last_30d",
        "is_premium",
    ];

    pub fn features(&self) -> [f64; 5] {
        [
            self.age,
            self.income,
            self.account_balance,
            self.transactions_last_30d,
            self.is_premium,
        ]
    }

    /// Build from a slice in feature order.
    pub fn from_slice(values: &[f64]) -> Result<Self, String> {
        match values {
            [age, income, account_balance, transactions_last_30d, is_premium] => Ok(Self {
                age: *age,
                income: *income,
                account_balance: *account_balance,
                transactions_last_30d: *transactions_last_30d,
                is_premium: *is_premium,
            }),
            _ => Err(format!(
                "expected {} features, got {}",
                Self::FEATURE_NAMES.len(),
                values.len()
            )),
        }
    }

    /// All values finite and non-negative; `is_premium` at most 1.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in Self::FEATURE_NAMES.iter().zip(self.features()) {
            if !value.is_finite() {
                return Err(format!("{} must be a finite number", name));
            }
            if value < 0.0 {
                return Err(format!("{} must be greater than or equal to 0", name));
            }
        }
        if self.is_premium > 1.0 {
            return Err("is_premium must be less than or equal to 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub probability: f64,
}

/// Handlers bound to one serving cache.
pub struct ServingApi {
    cache: Arc<ServingCache>,
    health: HealthChecker,
}

impl ServingApi {
    pub fn new(cache: Arc<ServingCache>) -> Self {
        Self {
            cache,
            health: HealthChecker::new(),
        }
    }

    pub fn cache(&self) -> &Arc<ServingCache> {
        &self.cache
    }

    /// Liveness.
    pub fn healthz(&self) -> ApiResponse {
        let status = if self.health.is_alive() { "ok" } else { "down" };
        ApiResponse::ok(json!({ "status": status }))
    }

    /// Readiness after a refresh.
    pub fn readyz(&self) -> ApiResponse {
        ApiResponse::ok(json!({ "ready": self.cache.is_ready() }))
    }

    /// Full health report.
    pub fn status(&self) -> ApiResponse {
        let report = self.health.report(&self.cache);
        match serde_json::to_value(&report) {
            Ok(body) => ApiResponse::ok(body),
            Err(e) => ApiResponse::detail(500, e.to_string()),
        }
    }

    /// Force a re-resolve and reload.
    pub fn reload(&self) -> ApiResponse {
        self.cache.force_reload();
        ApiResponse::ok(json!({ "reloaded": self.cache.loaded_ref().is_some() }))
    }

    pub fn predict(&self, request: &PredictRequest) -> ApiResponse {
        if let Err(reason) = request.validate() {
            return ApiResponse::detail(422, reason);
        }

        match self.cache.predict(&request.features()) {
            Ok(p) => {
                let response = PredictResponse {
                    prediction: p.label,
                    probability: p.probability,
                };
                ApiResponse::ok(json!(response))
            }
            Err(e) => error_response(&e),
        }
    }

    /// Parse a JSON body, then predict. Malformed bodies are 422.
    pub fn predict_json(&self, body: &str) -> ApiResponse {
        match serde_json::from_str::<PredictRequest>(body) {
            Ok(request) => self.predict(&request),
            Err(e) => ApiResponse::detail(422, e.to_string()),
        }
    }
}

fn error_response(e: &ServingError) -> ApiResponse {
    if e.is_transient() {
        ApiResponse::detail(503, "Model not ready")
    } else if e.is_client_error() {
        ApiResponse::detail(422, e.to_string())
    } else {
        warn!(error = %e, "prediction failed");
        ApiResponse::detail(500, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PredictRequest {
        PredictRequest {
            age: 35.0,
            income: 52000.0,
            account_balance: 1200.0,
            transactions_last_30d: 14.0,
            is_premium: 1.0,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_negative_rejected() {
        let r = PredictRequest { income: -1.0, ..request() };
        assert!(r.validate().unwrap_err().contains("income"));
    }

    #[test]
    fn test_is_premium_upper_bound() {
        let r = PredictRequest { is_premium: 2.0, ..request() };
        assert!(r.validate().unwrap_err().contains("is_premium"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let r = PredictRequest { age: f64::NAN, ..request() };
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_from_slice_arity() {
        assert!(PredictRequest::from_slice(&[1.0, 2.0]).is_err());
        let r = PredictRequest::from_slice(&request().features()).unwrap();
        assert_eq!(r, request());
    }

    #[test]
    fn test_not_ready_maps_to_503() {
        let resp = error_response(&ServingError::NotReady);
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body["detail"], "Model not ready");
    }
}
