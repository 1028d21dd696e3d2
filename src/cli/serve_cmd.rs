// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Serving CLI subcommands: ready, predict, watch.

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::info;

use super::{EXIT_FAILURE, EXIT_OK, EXIT_USAGE};
use crate::api::PredictRequest;
use crate::config::EnvConfig;
use crate::serving::spawn_refresher;
use crate::Vault;

/// Readiness check. Prints the health report; exits 0 iff a model loads.
pub fn run_ready(cfg: &EnvConfig) -> i32 {
    let status = Vault::new(cfg).api.status();
    println!("{}", status.body);
    if status.body["ready"].as_bool() == Some(true) {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}

/// Parse `f1,f2,f3,f4,f5` into a request.
pub fn parse_features(raw: &str) -> Result<PredictRequest, String> {
    let values = raw
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("not a number: {:?}", v.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    PredictRequest::from_slice(&values)
}

/// Score one feature vector with the live model.
pub fn run_predict(cfg: &EnvConfig, raw: Option<&str>) -> i32 {
    let request = match raw.map(parse_features) {
        Some(Ok(r)) => r,
        Some(Err(e)) => {
            eprintln!("Invalid features: {}", e);
            return EXIT_USAGE;
        }
        None => {
            eprintln!("Usage: model-vault predict <{}>", PredictRequest::FEATURE_NAMES.join(","));
            return EXIT_USAGE;
        }
    };

    let response = Vault::new(cfg).api.predict(&request);
    println!("{}", response.body);
    match response.status {
        200 => EXIT_OK,
        422 => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}

/// Keep a serving cache warm until Ctrl-C, logging every reload.
pub async fn run_watch(cfg: &EnvConfig) -> i32 {
    let cache = Vault::new(cfg).cache;
    let shutdown = Arc::new(Notify::new());
    info!(
        artifacts = %cfg.artifacts_dir.display(),
        every_secs = cfg.refresh_interval.as_secs(),
        "watching registry"
    );
    let handle = spawn_refresher(Arc::clone(&cache), cfg.refresh_interval, Arc::clone(&shutdown));

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to listen for Ctrl-C: {}", e);
    }
    eprintln!("Shutdown signal received, stopping refresher...");
    shutdown.notify_one();

    match handle.await {
        Ok(()) => {
            info!(reloads = cache.reload_count(), "watch stopped");
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Refresher task failed: {}", e);
            EXIT_FAILURE
        }
    }
}
