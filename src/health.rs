// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Health reporting for the serving side.
//!
//! Liveness is unconditional; readiness means the serving cache holds a
//! model after a refresh.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::serving::ServingCache;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    /// Process is up but has no model to serve.
    Degraded,
}

/// Detailed health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub ready: bool,
    /// Label of the loaded model (version id or sub-directory name).
    pub model: Option<String>,
    /// Where the loaded model was resolved from.
    pub source: Option<String>,
    /// Recorded metric of the loaded version, when its metadata is versioned.
    pub score: Option<f64>,
    pub reload_count: u64,
    pub uptime_secs: u64,
}

/// Builds health reports against a serving cache.
pub struct HealthChecker {
    start_time: Instant,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Check liveness: process is responsive.
    pub fn is_alive(&self) -> bool {
        true
    }

    /// Generate full health report. Refreshes the cache first.
    pub fn report(&self, cache: &ServingCache) -> HealthReport {
        let ready = cache.is_ready();
        let loaded = cache.loaded_ref();

        HealthReport {
            state: if ready {
                HealthState::Healthy
            } else {
                HealthState::Degraded
            },
            ready,
            model: loaded.as_ref().map(|r| r.label.clone()),
            source: loaded.as_ref().map(|r| r.source.to_string()),
            score: cache.version_metadata().map(|m| m.score()),
            reload_count: cache.reload_count(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
