// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Version registry.
//!
//! Append-only set of immutable model versions plus the `CURRENT` pointer
//! naming the live one. Owns artifact validation, the promotion policy and
//! the atomic pointer swap.

mod error;
pub mod layout;
mod metadata;
mod pointer;
mod policy;
mod store;
mod version_id;

pub use error::RegistryError;
pub use layout::RegistryLayout;
pub use metadata::{Metric, ModelMetadata, FEATURE_SCHEMA_VERSION, METADATA_SCHEMA_VERSION};
pub use pointer::read_pointer;
pub use policy::{decide, PromotionDecision};
pub use store::{validate_model_dir, VersionInfo, VersionRegistry};
pub use version_id::{compare_version_ids, new_version_id};
