// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Serving cache: an in-memory mirror of the registry's live version.
//!
//! Every read path first calls `ensure_fresh`, which re-reads the pointer
//! and reloads only when the resolved reference changed. Resolution, the
//! conditional reload and the read of the loaded state happen under one
//! mutex, so reloads are serialized and no caller sees a half-installed
//! model. A new model replaces the old one only after it is fully decoded.
//!
//! State machine: `EMPTY -> LOADED(ref)`; from `LOADED(ref)` the cache stays,
//! moves to `LOADED(ref')`, or drops back to `EMPTY` when the resolved
//! directory has lost its artifacts, or the pointer is gone or corrupt.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::error::ServingError;
use super::loader::{load_model, LoadedModel};
use super::model::{ArtifactDecoder, JsonLogisticDecoder, Prediction, Scorer};
use super::resolve::{ModelRef, Resolver};
use crate::registry::{ModelMetadata, RegistryError};
use crate::telemetry::{record_prediction, record_reload, set_ready, ReloadOutcome};

/// What a refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Loaded reference still matches; nothing was read beyond the pointer.
    Unchanged,
    /// A model was (re)loaded.
    Reloaded,
    /// Nothing servable; the cache is empty.
    Empty,
    /// Loading failed; the previously loaded model (if any) is kept.
    Failed,
}

#[derive(Default)]
struct CacheState {
    loaded: Option<LoadedModel>,
    /// Reference whose last load failed with a non-missing error. While a
    /// model is loaded, `ensure_fresh` does not retry it until the
    /// reference changes.
    failed: Option<ModelRef>,
}

/// Concurrency-safe handle to the currently served model.
pub struct ServingCache {
    resolver: Resolver,
    decoder: Arc<dyn ArtifactDecoder>,
    state: Mutex<CacheState>,
    reloads: AtomicU64,
}

impl ServingCache {
    pub fn new(resolver: Resolver, decoder: Arc<dyn ArtifactDecoder>) -> Self {
        Self {
            resolver,
            decoder,
            state: Mutex::new(CacheState::default()),
            reloads: AtomicU64::new(0),
        }
    }

    /// Cache over an artifacts root with the default JSON decoder.
    pub fn for_artifacts(artifacts_dir: &Path, subdir: Option<&str>) -> Self {
        Self::new(
            Resolver::for_artifacts(artifacts_dir, subdir),
            Arc::new(JsonLogisticDecoder),
        )
    }

    /// Re-resolve and reload regardless of what is loaded.
    pub fn force_reload(&self) -> RefreshOutcome {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state, true)
    }

    /// Reload only if the resolved reference differs from the loaded one.
    pub fn ensure_fresh(&self) -> RefreshOutcome {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state, false)
    }

    /// True iff, after a refresh, a model is loaded.
    pub fn is_ready(&self) -> bool {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state, false);
        state.loaded.is_some()
    }

    /// Score `features` with the live model.
    pub fn predict(&self, features: &[f64]) -> Result<Prediction, ServingError> {
        let scorer = self.fresh_scorer()?;
        if let Some(expected) = scorer.n_features() {
            if features.len() != expected {
                return Err(ServingError::InvalidInput(format!(
                    "expected {} features, got {}",
                    expected,
                    features.len()
                )));
            }
        }
        let probability = scorer.predict_proba(features)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ServingError::Scoring(format!(
                "probability {} outside [0, 1]",
                probability
            )));
        }
        let prediction = Prediction::from_probability(probability);
        record_prediction(prediction.label);
        Ok(prediction)
    }

    /// Refresh, then take a handle on the loaded scorer. Scoring runs on
    /// this snapshot outside the lock; a concurrent reload swaps the cache
    /// entry but never mutates a model already handed out.
    fn fresh_scorer(&self) -> Result<Arc<dyn Scorer>, ServingError> {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state, false);
        state
            .loaded
            .as_ref()
            .map(|m| Arc::clone(&m.scorer))
            .ok_or(ServingError::NotReady)
    }

    /// Reference of the loaded model, without refreshing.
    pub fn loaded_ref(&self) -> Option<ModelRef> {
        self.state.lock().loaded.as_ref().map(|m| m.reference.clone())
    }

    /// Version id (or override directory name) of the loaded model.
    pub fn loaded_version(&self) -> Option<String> {
        self.state.lock().loaded.as_ref().map(|m| m.reference.label.clone())
    }

    /// Metadata document of the loaded model, without refreshing.
    pub fn metadata(&self) -> Option<serde_json::Value> {
        self.state.lock().loaded.as_ref().map(|m| m.metadata.clone())
    }

    /// Metadata of the loaded model as the versioned schema, when it
    /// conforms. Legacy and override directories usually do not.
    pub fn version_metadata(&self) -> Option<ModelMetadata> {
        self.state.lock().loaded.as_ref().and_then(LoadedModel::version_metadata)
    }

    /// Number of successful loads since construction.
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::SeqCst)
    }

    fn refresh_locked(&self, state: &mut CacheState, force: bool) -> RefreshOutcome {
        let target = match self.resolver.resolve() {
            Ok(target) => target,
            Err(e) if is_unresolvable(&e) => {
                warn!(error = %e, "model reference unresolvable");
                None
            }
            Err(e) => {
                error!(error = %e, "model resolution failed; keeping loaded model");
                record_reload(ReloadOutcome::Failed);
                return RefreshOutcome::Failed;
            }
        };

        let target = match target {
            Some(t) => t,
            None => return self.clear(state, "no model resolvable"),
        };

        if !force {
            if state.loaded.as_ref().map(|m| &m.reference) == Some(&target) {
                return RefreshOutcome::Unchanged;
            }
            // With nothing loaded every refresh retries.
            if state.loaded.is_some() && state.failed.as_ref() == Some(&target) {
                return RefreshOutcome::Failed;
            }
        }

        match load_model(&target, self.decoder.as_ref()) {
            Ok(model) => {
                let previous = state.loaded.as_ref().map(|m| m.reference.label.clone());
                info!(
                    source = %target.source,
                    model = %target.label,
                    previous = previous.as_deref().unwrap_or("none"),
                    "model loaded"
                );
                state.loaded = Some(model);
                state.failed = None;
                self.reloads.fetch_add(1, Ordering::SeqCst);
                record_reload(ReloadOutcome::Loaded);
                set_ready(true);
                RefreshOutcome::Reloaded
            }
            Err(ServingError::Resolve(e)) if e.is_not_found() => {
                self.clear(state, "resolved model directory is incomplete")
            }
            Err(e) => {
                error!(
                    source = %target.source,
                    model = %target.label,
                    error = %e,
                    "model load failed; keeping loaded model"
                );
                state.failed = Some(target);
                record_reload(ReloadOutcome::Failed);
                RefreshOutcome::Failed
            }
        }
    }

    fn clear(&self, state: &mut CacheState, reason: &'static str) -> RefreshOutcome {
        state.failed = None;
        if let Some(old) = state.loaded.take() {
            warn!(model = %old.reference.label, reason, "serving cache emptied");
            record_reload(ReloadOutcome::Empty);
        } else {
            debug!(reason, "serving cache empty");
        }
        set_ready(false);
        RefreshOutcome::Empty
    }
}

/// Resolution errors that mean "nothing servable" rather than a fault
/// worth riding out on the old model.
fn is_unresolvable(e: &RegistryError) -> bool {
    matches!(e, RegistryError::NotFound(_) | RegistryError::Corrupt { .. })
}
