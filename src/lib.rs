// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model Vault
//!
//! A filesystem-backed registry of immutable model versions with an atomic
//! `CURRENT` pointer, plus a serving cache that follows that pointer.
//!
//! # Layout
//!
//! ```text
//! <artifacts>/models/
//!     versions/<id>/model.bin
//!     versions/<id>/metadata.json
//!     CURRENT
//! ```
//!
//! # Guarantees
//!
//! - Versions are write-once. `metadata.json` is written last and marks a
//!   version complete.
//! - `CURRENT` only ever names a validated version and is replaced with a
//!   single rename, so readers see the old or the new id, never a mix.
//! - The serving cache reloads only when the resolved version changes and
//!   keeps serving the previous model when a new one fails to load.

pub mod api;
pub mod cli;
pub mod config;
pub mod health;
pub mod pipeline;
pub mod registry;
pub mod serving;
pub mod telemetry;

use std::sync::Arc;

use api::ServingApi;
use config::EnvConfig;
use registry::VersionRegistry;
use serving::ServingCache;

/// Registry and serving cache over one artifacts directory.
pub struct Vault {
    pub registry: VersionRegistry,
    pub cache: Arc<ServingCache>,
    pub api: ServingApi,
}

impl Vault {
    pub fn new(config: &EnvConfig) -> Self {
        let registry = VersionRegistry::open(&config.artifacts_dir);
        let cache = Arc::new(ServingCache::for_artifacts(
            &config.artifacts_dir,
            config.model_subdir.as_deref(),
        ));
        let api = ServingApi::new(Arc::clone(&cache));

        Self { registry, cache, api }
    }
}
