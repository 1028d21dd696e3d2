// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults.

use crate::config::{EnvConfig, DEFAULT_ARTIFACTS_DIR, DEFAULT_METRIC_NAME, DEFAULT_REFRESH_SECS};

/// Print effective config as `KEY=value` lines to stdout.
pub fn run_show(cfg: &EnvConfig) {
    for (key, value) in cfg.effective_pairs() {
        println!("{}={}", key, value);
    }
}

/// Print default config values (no file or env overrides) to stdout.
pub fn run_defaults() {
    println!("ARTIFACTS_DIR={}", DEFAULT_ARTIFACTS_DIR);
    println!("MODEL_SUBDIR=");
    println!("MODEL_VAULT_LOG_FORMAT=json");
    println!("MODEL_VAULT_LOG_LEVEL=info");
    println!("MODEL_VAULT_REFRESH_SECS={}", DEFAULT_REFRESH_SECS);
    println!("MODEL_VAULT_METRIC_NAME={}", DEFAULT_METRIC_NAME);
}
