// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Serving side: resolve the live model, keep it loaded, score requests.

mod cache;
mod error;
mod loader;
mod model;
mod refresher;
mod resolve;

pub use cache::{RefreshOutcome, ServingCache};
pub use error::ServingError;
pub use loader::{load_model, LoadedModel, MappedArtifact};
pub use model::{
    ArtifactDecoder, JsonLogisticDecoder, LogisticModel, Prediction, Scorer, POSITIVE_THRESHOLD,
};
pub use refresher::spawn_refresher;
pub use resolve::{
    CurrentPointer, LegacyLocation, ModelRef, ModelSource, ResolveStrategy, Resolver,
    SubdirOverride,
};
