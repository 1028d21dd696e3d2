// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Loading a resolved model directory into memory.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use super::error::ServingError;
use super::model::{ArtifactDecoder, Scorer};
use super::resolve::ModelRef;
use crate::registry::{layout, validate_model_dir, ModelMetadata, RegistryError};

/// A fully decoded model ready to serve.
#[derive(Clone)]
pub struct LoadedModel {
    pub reference: ModelRef,
    pub scorer: Arc<dyn Scorer>,
    /// Raw metadata document. Legacy directories predate the versioned
    /// schema, so this is kept untyped.
    pub metadata: serde_json::Value,
}

impl LoadedModel {
    /// Metadata as the versioned schema, when it conforms.
    pub fn version_metadata(&self) -> Option<ModelMetadata> {
        serde_json::from_value(self.metadata.clone()).ok()
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("reference", &self.reference)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Memory-mapped artifact for zero-copy decoding.
pub struct MappedArtifact {
    mmap: Mmap,
}

impl MappedArtifact {
    pub fn open(path: &Path) -> Result<Self, ServingError> {
        let file = File::open(path).map_err(|e| RegistryError::io(path, e))?;
        let len = file.metadata().map_err(|e| RegistryError::io(path, e))?.len();
        if len == 0 {
            return Err(ServingError::Decode(format!("empty artifact {}", path.display())));
        }
        // SAFETY: read-only mapping of a write-once version file. The bytes
        // are decoded into an owned model before the map is dropped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| RegistryError::io(path, e))?;
        Ok(Self { mmap })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

/// Validate, read metadata, and decode the artifact of `reference`.
///
/// Missing files surface as `Resolve(NotFound)`; unreadable metadata as
/// `Resolve(Corrupt)`; a bad artifact as `Decode`.
pub fn load_model(
    reference: &ModelRef,
    decoder: &dyn ArtifactDecoder,
) -> Result<LoadedModel, ServingError> {
    let dir = &reference.dir;
    validate_model_dir(dir)?;

    let meta_path = layout::metadata_path(dir);
    let meta_text = std::fs::read_to_string(&meta_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RegistryError::NotFound(dir.clone())
        } else {
            RegistryError::io(&meta_path, e)
        }
    })?;
    let metadata: serde_json::Value = serde_json::from_str(&meta_text)
        .map_err(|e| RegistryError::corrupt(&meta_path, e.to_string()))?;

    let artifact = MappedArtifact::open(&layout::artifact_path(dir))?;
    let scorer = decoder.decode(artifact.as_bytes())?;

    Ok(LoadedModel { reference: reference.clone(), scorer, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serving::model::JsonLogisticDecoder;
    use crate::serving::resolve::ModelSource;
    use std::fs;
    use tempfile::TempDir;

    fn reference(dir: &Path) -> ModelRef {
        ModelRef { source: ModelSource::Legacy, label: "production".into(), dir: dir.to_path_buf() }
    }

    #[test]
    fn test_missing_dir_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_model(&reference(&dir.path().join("nope")), &JsonLogisticDecoder).unwrap_err();
        assert!(matches!(err, ServingError::Resolve(RegistryError::NotFound(_))));
    }

    #[test]
    fn test_empty_artifact_is_decode_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("model.bin"), b"").unwrap();
        fs::write(dir.path().join("metadata.json"), b"{}").unwrap();
        let err = load_model(&reference(dir.path()), &JsonLogisticDecoder).unwrap_err();
        assert!(matches!(err, ServingError::Decode(_)));
    }

    #[test]
    fn test_legacy_metadata_is_kept_untyped() {
        let dir = TempDir::new().unwrap();
        let model = br#"{"means":[0],"scales":[1],"weights":[1],"intercept":0}"#;
        fs::write(dir.path().join("model.bin"), model).unwrap();
        fs::write(dir.path().join("metadata.json"), br#"{"metric_name":"f1","score":1.0}"#).unwrap();

        let loaded = load_model(&reference(dir.path()), &JsonLogisticDecoder).unwrap();
        assert_eq!(loaded.metadata["score"], 1.0);
        assert!(loaded.version_metadata().is_none());
    }

    #[test]
    fn test_mapped_artifact_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        fs::write(&path, b"abc").unwrap();
        let mapped = MappedArtifact::open(&path).unwrap();
        assert_eq!(mapped.as_bytes(), b"abc");
        assert_eq!(mapped.len(), 3);
        assert!(!mapped.is_empty());
    }
}
