// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration.
//!
//! Values come from built-in defaults, then an optional TOML file named by
//! `MODEL_VAULT_CONFIG`, then environment variables (highest priority).
//! Invalid numeric or format values fall back to defaults without failing;
//! only an unreadable or malformed config file is an error.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `ARTIFACTS_DIR` | `/artifacts` | Artifacts root; registry lives in `<dir>/models` |
//! | `MODEL_SUBDIR` | unset | Serve a fixed sub-directory of the artifacts root |
//! | `MODEL_VAULT_CONFIG` | unset | Optional TOML file with the keys below |
//! | `MODEL_VAULT_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `MODEL_VAULT_LOG_LEVEL` | `info` | Tracing filter directive |
//! | `MODEL_VAULT_LOG_FILE` | unset | Append logs to this file instead of stderr |
//! | `MODEL_VAULT_REFRESH_SECS` | 5 | Background refresh interval (secs) |
//! | `MODEL_VAULT_METRIC_NAME` | `f1` | Metric name recorded by `publish` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_ARTIFACTS_DIR: &str = "/artifacts";
pub const DEFAULT_REFRESH_SECS: u64 = 5;
pub const DEFAULT_METRIC_NAME: &str = "f1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Keys accepted in the TOML config file. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    artifacts_dir: Option<PathBuf>,
    model_subdir: Option<String>,
    log_format: Option<String>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    refresh_secs: Option<u64>,
    metric_name: Option<String>,
}

/// Effective configuration after layering.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub artifacts_dir: PathBuf,
    pub model_subdir: Option<String>,
    pub log: LogConfig,
    pub refresh_interval: Duration,
    pub metric_name: String,
    pub config_file: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            model_subdir: None,
            log: LogConfig::default(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            metric_name: DEFAULT_METRIC_NAME.to_string(),
            config_file: None,
        }
    }
}

/// Non-empty env var value.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a `u64` env var, returning `None` on missing or invalid.
fn parse_u64(key: &str) -> Option<u64> {
    env_var(key).and_then(|v| v.trim().parse::<u64>().ok())
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load configuration from defaults, optional file, and environment.
pub fn load() -> Result<EnvConfig, ConfigError> {
    let config_file = env_var("MODEL_VAULT_CONFIG").map(PathBuf::from);
    let file = match &config_file {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    let mut cfg = EnvConfig { config_file, ..EnvConfig::default() };

    if let Some(dir) = env_var("ARTIFACTS_DIR").map(PathBuf::from).or(file.artifacts_dir) {
        cfg.artifacts_dir = dir;
    }
    cfg.model_subdir = env_var("MODEL_SUBDIR").or(file.model_subdir).filter(|s| !s.is_empty());

    let format = env_var("MODEL_VAULT_LOG_FORMAT").or(file.log_format);
    cfg.log.format = format
        .and_then(|f| f.parse::<LogFormat>().ok())
        .unwrap_or_default();
    if let Some(level) = env_var("MODEL_VAULT_LOG_LEVEL").or(file.log_level) {
        cfg.log.level = level;
    }
    cfg.log.output_path = env_var("MODEL_VAULT_LOG_FILE").map(PathBuf::from).or(file.log_file);

    let refresh_secs = parse_u64("MODEL_VAULT_REFRESH_SECS")
        .or(file.refresh_secs)
        .unwrap_or(DEFAULT_REFRESH_SECS)
        .max(1); // floor: 1s
    cfg.refresh_interval = Duration::from_secs(refresh_secs);

    if let Some(name) = env_var("MODEL_VAULT_METRIC_NAME").or(file.metric_name) {
        cfg.metric_name = name;
    }

    Ok(cfg)
}

impl EnvConfig {
    /// `KEY=value` pairs of all effective values, in documentation order.
    pub fn effective_pairs(&self) -> Vec<(&'static str, String)> {
        let format = match self.log.format {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        vec![
            ("ARTIFACTS_DIR", self.artifacts_dir.display().to_string()),
            ("MODEL_SUBDIR", self.model_subdir.clone().unwrap_or_default()),
            (
                "MODEL_VAULT_CONFIG",
                self.config_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            ("MODEL_VAULT_LOG_FORMAT", format.to_string()),
            ("MODEL_VAULT_LOG_LEVEL", self.log.level.clone()),
            (
                "MODEL_VAULT_LOG_FILE",
                self.log
                    .output_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            ("MODEL_VAULT_REFRESH_SECS", self.refresh_interval.as_secs().to_string()),
            ("MODEL_VAULT_METRIC_NAME", self.metric_name.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "ARTIFACTS_DIR",
        "MODEL_SUBDIR",
        "MODEL_VAULT_CONFIG",
        "MODEL_VAULT_LOG_FORMAT",
        "MODEL_VAULT_LOG_LEVEL",
        "MODEL_VAULT_LOG_FILE",
        "MODEL_VAULT_REFRESH_SECS",
        "MODEL_VAULT_METRIC_NAME",
    ];

    fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load().unwrap();
        assert_eq!(cfg.artifacts_dir, PathBuf::from("/artifacts"));
        assert_eq!(cfg.model_subdir, None);
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.refresh_interval, Duration::from_secs(5));
        assert_eq!(cfg.metric_name, "f1");
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("ARTIFACTS_DIR", "/srv/artifacts");
        std::env::set_var("MODEL_SUBDIR", "pinned");
        std::env::set_var("MODEL_VAULT_LOG_FORMAT", "pretty");
        std::env::set_var("MODEL_VAULT_REFRESH_SECS", "30");
        let cfg = load().unwrap();
        assert_eq!(cfg.artifacts_dir, PathBuf::from("/srv/artifacts"));
        assert_eq!(cfg.model_subdir.as_deref(), Some("pinned"));
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert_eq!(cfg.refresh_interval.as_secs(), 30);
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("MODEL_VAULT_REFRESH_SECS", "soon");
        std::env::set_var("MODEL_VAULT_LOG_FORMAT", "xml");
        let cfg = load().unwrap();
        assert_eq!(cfg.refresh_interval.as_secs(), DEFAULT_REFRESH_SECS);
        assert_eq!(cfg.log.format, LogFormat::Json);
        clear_env_vars();
    }

    #[test]
    fn test_refresh_interval_floor() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("MODEL_VAULT_REFRESH_SECS", "0");
        let cfg = load().unwrap();
        assert_eq!(cfg.refresh_interval.as_secs(), 1);
        clear_env_vars();
    }

    #[test]
    fn test_file_layer_under_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vault.toml");
        std::fs::write(
            &path,
            "artifacts_dir = \"/from/file\"\nmetric_name = \"auc\"\nrefresh_secs = 9\n",
        )
        .unwrap();
        std::env::set_var("MODEL_VAULT_CONFIG", &path);
        std::env::set_var("MODEL_VAULT_METRIC_NAME", "f1_macro");

        let cfg = load().unwrap();
        assert_eq!(cfg.artifacts_dir, PathBuf::from("/from/file"));
        assert_eq!(cfg.refresh_interval.as_secs(), 9);
        assert_eq!(cfg.metric_name, "f1_macro");
        assert_eq!(cfg.config_file.as_deref(), Some(path.as_path()));
        clear_env_vars();
    }

    #[test]
    fn test_malformed_file_is_error() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vault.toml");
        std::fs::write(&path, "unknown_key = 1\n").unwrap();
        std::env::set_var("MODEL_VAULT_CONFIG", &path);
        assert!(matches!(load(), Err(ConfigError::Parse { .. })));
        clear_env_vars();
    }

    #[test]
    fn test_effective_pairs_cover_all_keys() {
        let cfg = EnvConfig::default();
        let keys: Vec<_> = cfg.effective_pairs().into_iter().map(|(k, _)| k).collect();
        for k in ENV_KEYS {
            assert!(keys.contains(k), "missing {}", k);
        }
    }
}
