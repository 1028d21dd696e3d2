// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Span utilities for registry operations.

use tracing::{info_span, Span};

/// Extension trait for recording an operation's outcome on its span.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for registry operation spans.
pub struct RegistrySpan;

impl RegistrySpan {
    /// Span with `operation`, `version` and an empty `status` / `error.message`.
    pub fn new(operation: &'static str, version: &str) -> Span {
        info_span!(
            "registry_op",
            operation = operation,
            version = %version,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }
}
