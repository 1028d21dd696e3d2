// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Registry CLI subcommands: current, list, promote, rollback, publish.

use std::path::Path;

use chrono::{DateTime, Utc};

use super::{flag_value, truncate, EXIT_FAILURE, EXIT_OK, EXIT_USAGE};
use crate::config::EnvConfig;
use crate::pipeline::{publish_files, PipelineError};
use crate::registry::{RegistryError, VersionInfo, VersionRegistry};

fn open(cfg: &EnvConfig) -> VersionRegistry {
    VersionRegistry::open(&cfg.artifacts_dir)
}

fn exit_code(e: &RegistryError) -> i32 {
    if e.is_fatal() {
        EXIT_USAGE
    } else {
        EXIT_FAILURE
    }
}

/// Print the live version id.
pub fn run_current(cfg: &EnvConfig) -> i32 {
    match open(cfg).read_current() {
        Ok(Some(id)) => {
            println!("{}", id);
            EXIT_OK
        }
        Ok(None) => {
            println!("No version promoted yet.");
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Print all versions, oldest first.
pub fn run_list(cfg: &EnvConfig) -> i32 {
    let registry = open(cfg);
    match registry.describe_versions() {
        Ok(versions) => {
            print_versions(&registry, &versions);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Format and print a version table to stdout.
pub fn print_versions(registry: &VersionRegistry, versions: &[VersionInfo]) {
    if versions.is_empty() {
        println!("No versions in {}.", registry.layout().root().display());
        return;
    }

    println!(
        "{:<24} {:<10} {:>10} {:<22} {}",
        "VERSION", "STATE", "SCORE", "TRAINED", "LIVE"
    );
    println!("{}", "-".repeat(74));

    for v in versions {
        let state = if v.complete { "complete" } else { "invalid" };
        let score = v
            .score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_else(|| "-".to_string());
        let trained = if v.complete {
            registry
                .read_metadata(&v.id)
                .ok()
                .and_then(|m| format_timestamp(m.trained_at))
                .unwrap_or_else(|| "-".to_string())
        } else {
            "-".to_string()
        };
        println!(
            "{:<24} {:<10} {:>10} {:<22} {}",
            truncate(&v.id, 23),
            state,
            score,
            trained,
            if v.is_current { "*" } else { "" },
        );
    }
}

fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Point the registry at `version_id` after validating it.
pub fn run_promote(cfg: &EnvConfig, version_id: &str) -> i32 {
    match open(cfg).promote(version_id) {
        Ok(()) => {
            println!("Promoted {}", version_id);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Re-point to an older version, reporting what was live before.
pub fn run_rollback(cfg: &EnvConfig, version_id: &str) -> i32 {
    match open(cfg).rollback(version_id) {
        Ok(previous) => {
            println!(
                "Rolled back to {} (was {})",
                version_id,
                previous.as_deref().unwrap_or("none")
            );
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// `publish --artifact <path> --score <f> --data <csv> [--metric <name>]`
pub fn run_publish(cfg: &EnvConfig, args: &[String]) -> i32 {
    let (artifact, score, data) = match (
        flag_value(args, "--artifact"),
        flag_value(args, "--score"),
        flag_value(args, "--data"),
    ) {
        (Some(a), Some(s), Some(d)) => (a, s, d),
        _ => {
            eprintln!(
                "Usage: model-vault publish --artifact <PATH> --score <F> --data <CSV> [--metric <NAME>]"
            );
            return EXIT_USAGE;
        }
    };
    let score: f64 = match score.parse() {
        Ok(s) => s,
        Err(_) => {
            eprintln!("Invalid --score value: {}", score);
            return EXIT_USAGE;
        }
    };
    let metric = flag_value(args, "--metric").unwrap_or(cfg.metric_name.as_str());

    let result = publish_files(
        &open(cfg),
        Path::new(artifact),
        Path::new(data),
        metric,
        score,
        Utc::now().timestamp(),
    );

    match result {
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(line) => {
                println!("{}", line);
                EXIT_OK
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_FAILURE
            }
        },
        Err(PipelineError::Registry(e)) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}
