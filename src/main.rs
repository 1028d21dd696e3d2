// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model Vault entry point.
//!
//! Loads configuration, initializes logging, then runs one subcommand
//! against the artifacts directory.

use std::process::ExitCode;

use model_vault::cli::{config_cmd, models_cmd, serve_cmd, EXIT_FAILURE, EXIT_USAGE};
use model_vault::config;
use model_vault::telemetry::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "help" | "--help" | "-h" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "version" | "--version" | "-V" => {
            println!("model-vault {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return exit(EXIT_USAGE);
        }
    };
    if let Err(e) = init_logging(&cfg.log) {
        eprintln!("Logging setup failed: {}", e);
        return exit(EXIT_USAGE);
    }

    let arg = args.get(2).map(|s| s.as_str());
    let code = match command {
        "current" => models_cmd::run_current(&cfg),
        "list" => models_cmd::run_list(&cfg),
        "promote" | "rollback" => match arg {
            Some(id) if command == "promote" => models_cmd::run_promote(&cfg, id),
            Some(id) => models_cmd::run_rollback(&cfg, id),
            None => {
                eprintln!("Usage: model-vault {} <VERSION_ID>", command);
                EXIT_USAGE
            }
        },
        "publish" => models_cmd::run_publish(&cfg, &args[2..]),
        "ready" | "readiness" => serve_cmd::run_ready(&cfg),
        "predict" => serve_cmd::run_predict(&cfg, arg),
        "watch" => serve_cmd::run_watch(&cfg).await,
        "config" => match arg.unwrap_or("show") {
            "show" => {
                config_cmd::run_show(&cfg);
                0
            }
            "defaults" => {
                config_cmd::run_defaults();
                0
            }
            other => {
                eprintln!("Unknown config subcommand: {}", other);
                EXIT_USAGE
            }
        },
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            EXIT_USAGE
        }
    };

    exit(code)
}

fn exit(code: i32) -> ExitCode {
    u8::try_from(code)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::from(EXIT_FAILURE as u8))
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "model-vault v{}

USAGE:
    model-vault <COMMAND> [ARGS]

REGISTRY COMMANDS:
    current               Print the live version id
    list                  List versions with state, score and live marker
    promote <ID>          Validate a version and point CURRENT at it
    rollback <ID>         Point CURRENT back at a retained version
    publish --artifact <PATH> --score <F> --data <CSV> [--metric <NAME>]
                          Validate training data, store a new version and
                          promote it if it beats the live score

SERVING COMMANDS:
    ready                 Readiness check (exit 0 if a model loads)
    predict <F1,...,F5>   Score age,income,account_balance,transactions_last_30d,is_premium
    watch                 Keep a serving cache refreshed until Ctrl-C

OTHER:
    config [show|defaults]  Print configuration
    version                 Show version information
    help                    Show this help message

ENVIRONMENT:
    ARTIFACTS_DIR              Artifacts root (default: /artifacts)
    MODEL_SUBDIR               Serve a fixed sub-directory instead of CURRENT
    MODEL_VAULT_CONFIG         Optional TOML config file
    MODEL_VAULT_LOG_FORMAT     json | pretty (default: json)
    MODEL_VAULT_LOG_LEVEL      Tracing filter (default: info)
    MODEL_VAULT_LOG_FILE       Append logs to this file
    MODEL_VAULT_REFRESH_SECS   Background refresh interval (default: 5)
    MODEL_VAULT_METRIC_NAME    Metric name recorded by publish (default: f1)

EXIT CODES:
    0  Success / Ready
    1  Failure / Not ready
    2  Configuration or usage error
",
        version
    );
}
