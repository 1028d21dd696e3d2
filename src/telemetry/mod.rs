// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Telemetry for Model Vault.
//!
//! Structured logging through `tracing`, counters and gauges through the
//! `metrics` facade. Exporters are chosen by the embedding process.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{
    record_prediction, record_promotion, record_reload, record_version_written, set_ready,
    ReloadOutcome,
};
pub use spans::{RegistrySpan, SpanExt};
