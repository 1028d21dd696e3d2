// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for the `model-vault` binary.
//!
//! Every command works directly on the artifacts directory; there is no
//! server to connect to.
//!
//! ## Usage
//!
//! ```bash
//! model-vault current          # Print the live version id
//! model-vault list             # Table of all versions
//! model-vault publish --artifact model.bin --score 0.81 --data day.csv
//! model-vault ready            # Readiness check, exits 0 if a model loads
//! ```

pub mod config_cmd;
pub mod models_cmd;
pub mod serve_cmd;

/// Command succeeded (or the readiness check passed).
pub const EXIT_OK: i32 = 0;
/// Operation failed or the readiness check did not pass.
pub const EXIT_FAILURE: i32 = 1;
/// Bad configuration or command-line usage.
pub const EXIT_USAGE: i32 = 2;

/// Value following `flag` in `args`, if present.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
