// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! On-disk layout shared by the registry writer and serving readers.
//!
//! ```text
//! <artifacts>/models/
//!     CURRENT                  live version id, trimmed text
//!     versions/<id>/model.bin
//!     versions/<id>/metadata.json
//!     production/              pre-versioning deployments, read-only
//! ```

use std::path::{Path, PathBuf};

pub const MODELS_DIR: &str = "models";
pub const VERSIONS_DIR: &str = "versions";
pub const POINTER_FILE: &str = "CURRENT";
pub const LEGACY_DIR: &str = "production";
pub const ARTIFACT_FILE: &str = "model.bin";
pub const METADATA_FILE: &str = "metadata.json";

/// Path helpers rooted at the registry root (`<artifacts>/models`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLayout {
    root: PathBuf,
}

impl RegistryLayout {
    /// Layout for a registry rooted directly at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout for the registry under an artifacts directory.
    pub fn under_artifacts(artifacts_dir: &Path) -> Self {
        Self::new(artifacts_dir.join(MODELS_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(VERSIONS_DIR)
    }

    pub fn version_dir(&self, version_id: &str) -> PathBuf {
        self.versions_dir().join(version_id)
    }

    pub fn pointer_path(&self) -> PathBuf {
        self.root.join(POINTER_FILE)
    }

    pub fn legacy_dir(&self) -> PathBuf {
        self.root.join(LEGACY_DIR)
    }

    /// Temp pointer location unique to this process and instant.
    pub fn pointer_tmp_path(&self, pid: u32, nanos: u128) -> PathBuf {
        self.root.join(format!(".{}.tmp-{}-{}", POINTER_FILE, pid, nanos))
    }
}

/// Artifact file inside a model directory.
pub fn artifact_path(model_dir: &Path) -> PathBuf {
    model_dir.join(ARTIFACT_FILE)
}

/// Metadata file inside a model directory.
pub fn metadata_path(model_dir: &Path) -> PathBuf {
    model_dir.join(METADATA_FILE)
}

/// Reject ids that would escape the versions directory.
pub fn is_valid_version_id(version_id: &str) -> bool {
    !version_id.is_empty()
        && version_id != "."
        && version_id != ".."
        && version_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
