// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Filesystem-backed version registry.
//!
//! Versions are write-once directories under `versions/`. The only mutable
//! file is `CURRENT`, replaced by rename. There is no cross-process locking
//! beyond that rename.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::RegistryError;
use super::layout::{self, RegistryLayout, ARTIFACT_FILE, METADATA_FILE};
use super::metadata::ModelMetadata;
use super::pointer::{read_pointer, swap_pointer, sync_dir, write_synced};
use super::version_id::{compare_version_ids, new_version_id};
use crate::telemetry::{record_version_written, RegistrySpan, SpanExt};

/// Confirm a model directory holds both the artifact and the metadata file.
pub fn validate_model_dir(model_dir: &Path) -> Result<(), RegistryError> {
    let artifact = layout::artifact_path(model_dir);
    let metadata = layout::metadata_path(model_dir);
    if !artifact.is_file() || !metadata.is_file() {
        return Err(RegistryError::NotFound(model_dir.to_path_buf()));
    }
    Ok(())
}

/// Summary of a retained version, for listing and rollback selection.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionInfo {
    pub id: String,
    pub complete: bool,
    pub score: Option<f64>,
    pub is_current: bool,
}

/// The version registry rooted at `<artifacts>/models`.
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    layout: RegistryLayout,
}

impl VersionRegistry {
    pub fn new(layout: RegistryLayout) -> Self {
        Self { layout }
    }

    /// Registry under an artifacts directory (`<artifacts_dir>/models`).
    pub fn open(artifacts_dir: &Path) -> Self {
        Self::new(RegistryLayout::under_artifacts(artifacts_dir))
    }

    pub fn layout(&self) -> &RegistryLayout {
        &self.layout
    }

    /// Directory of a version, after rejecting ids that could escape `versions/`.
    fn checked_version_dir(&self, version_id: &str) -> Result<PathBuf, RegistryError> {
        if !layout::is_valid_version_id(version_id) {
            return Err(RegistryError::Configuration(format!(
                "invalid version id: {:?}",
                version_id
            )));
        }
        Ok(self.layout.version_dir(version_id))
    }

    /// Both artifact and metadata exist for `version_id`.
    pub fn validate_artifacts(&self, version_id: &str) -> Result<(), RegistryError> {
        let dir = self.checked_version_dir(version_id)?;
        validate_model_dir(&dir)
    }

    /// The live version id, or `None` if no version was ever promoted.
    pub fn read_current(&self) -> Result<Option<String>, RegistryError> {
        read_pointer(&self.layout.pointer_path())
    }

    /// Full metadata record of a version.
    pub fn read_metadata(&self, version_id: &str) -> Result<ModelMetadata, RegistryError> {
        let dir = self.checked_version_dir(version_id)?;
        ModelMetadata::from_file(&layout::metadata_path(&dir))
    }

    /// Metric value recorded for a version.
    pub fn read_score(&self, version_id: &str) -> Result<f64, RegistryError> {
        Ok(self.read_metadata(version_id)?.score())
    }

    /// Score of the live version.
    ///
    /// `None` when no pointer is set or the pointed-to directory is gone.
    /// An existing but incomplete live directory is an error.
    pub fn read_current_score(&self) -> Result<Option<f64>, RegistryError> {
        let current = match self.read_current()? {
            Some(v) => v,
            None => return Ok(None),
        };
        let dir = self.checked_version_dir(&current)?;
        if !dir.exists() {
            warn!(version = %current, "CURRENT names a missing version directory");
            return Ok(None);
        }
        validate_model_dir(&dir)?;
        self.read_score(&current).map(Some)
    }

    /// Fresh id for the next version.
    pub fn new_version_id(&self) -> String {
        new_version_id()
    }

    /// Persist a new immutable version.
    ///
    /// The version directory is created exclusively; an existing directory
    /// at that id is a configuration error. The artifact lands first and the
    /// metadata last, each through a synced temp file and a rename, so a
    /// version validates only once both files are complete.
    pub fn write_version(
        &self,
        version_id: &str,
        artifact: &[u8],
        metadata: &ModelMetadata,
    ) -> Result<PathBuf, RegistryError> {
        let span = RegistrySpan::new("write_version", version_id);
        let _enter = span.enter();
        let result = self.write_version_inner(version_id, artifact, metadata);
        span.record_result(&result);
        result
    }

    fn write_version_inner(
        &self,
        version_id: &str,
        artifact: &[u8],
        metadata: &ModelMetadata,
    ) -> Result<PathBuf, RegistryError> {
        let dir = self.checked_version_dir(version_id)?;
        if metadata.model_version_id != version_id {
            return Err(RegistryError::Configuration(format!(
                "metadata names version {}, expected {}",
                metadata.model_version_id, version_id
            )));
        }
        metadata.validate().map_err(RegistryError::Configuration)?;
        let metadata_json = metadata.to_json()?;

        let versions_dir = self.layout.versions_dir();
        fs::create_dir_all(&versions_dir).map_err(|e| RegistryError::io(&versions_dir, e))?;

        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(RegistryError::Configuration(format!(
                    "version directory {} already exists",
                    dir.display()
                )));
            }
            Err(e) => return Err(RegistryError::io(&dir, e)),
        }

        write_file_atomic(&dir, ARTIFACT_FILE, artifact)?;
        write_file_atomic(&dir, METADATA_FILE, metadata_json.as_bytes())?;
        sync_dir(&dir);
        sync_dir(&versions_dir);

        validate_model_dir(&dir)?;
        record_version_written();
        info!(
            version = %version_id,
            metric = %metadata.metric.name,
            score = metadata.metric.value,
            artifact_bytes = artifact.len(),
            "version written"
        );
        Ok(dir)
    }

    /// Atomically point `CURRENT` at `version_id`.
    ///
    /// Validation failure aborts with `ValidationFailed` and leaves the
    /// pointer untouched.
    pub fn promote(&self, version_id: &str) -> Result<(), RegistryError> {
        let span = RegistrySpan::new("promote", version_id);
        let _enter = span.enter();
        let result = self.promote_inner(version_id);
        span.record_result(&result);
        result
    }

    fn promote_inner(&self, version_id: &str) -> Result<(), RegistryError> {
        let dir = self.checked_version_dir(version_id).map_err(|e| {
            RegistryError::ValidationFailed { version: version_id.to_string(), reason: e.to_string() }
        })?;
        validate_model_dir(&dir).map_err(|e| {
            if e.is_not_found() {
                RegistryError::ValidationFailed {
                    version: version_id.to_string(),
                    reason: e.to_string(),
                }
            } else {
                e
            }
        })?;

        let previous = self.current_for_log();
        swap_pointer(&self.layout, version_id)?;
        info!(
            version = %version_id,
            previous = previous.as_deref().unwrap_or("none"),
            "CURRENT pointer swapped"
        );
        Ok(())
    }

    /// Live version for log fields only. A read failure is logged, not
    /// returned, since the swap that follows replaces the file anyway.
    fn current_for_log(&self) -> Option<String> {
        match self.read_current() {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "could not read CURRENT before swap");
                None
            }
        }
    }

    /// Point `CURRENT` back at a retained version. Returns the version that
    /// was live before.
    pub fn rollback(&self, version_id: &str) -> Result<Option<String>, RegistryError> {
        let previous = self.read_current()?;
        if previous.as_deref() == Some(version_id) {
            debug!(version = %version_id, "rollback target is already live");
            return Ok(previous);
        }
        self.promote(version_id)?;
        warn!(
            version = %version_id,
            previous = previous.as_deref().unwrap_or("none"),
            "rolled back live version"
        );
        Ok(previous)
    }

    /// Ids of all retained version directories, oldest first.
    pub fn list_versions(&self) -> Result<Vec<String>, RegistryError> {
        let versions_dir = self.layout.versions_dir();
        let entries = match fs::read_dir(&versions_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RegistryError::io(&versions_dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RegistryError::io(&versions_dir, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') && layout::is_valid_version_id(name) {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort_by(|a, b| compare_version_ids(a, b));
        Ok(ids)
    }

    /// `list_versions` with completeness, score and live marker.
    pub fn describe_versions(&self) -> Result<Vec<VersionInfo>, RegistryError> {
        let current = self.read_current()?;
        let infos = self
            .list_versions()?
            .into_iter()
            .map(|id| VersionInfo {
                complete: self.validate_artifacts(&id).is_ok(),
                score: self.read_score(&id).ok(),
                is_current: current.as_deref() == Some(id.as_str()),
                id,
            })
            .collect();
        Ok(infos)
    }
}

/// Write `name` inside `dir` through a synced hidden temp file and a rename.
fn write_file_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<(), RegistryError> {
    let tmp = dir.join(format!(".{}.tmp", name));
    let target = dir.join(name);
    if let Err(e) = write_synced(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, &target).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        RegistryError::io(&target, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry() -> (TempDir, VersionRegistry) {
        let dir = TempDir::new().unwrap();
        let registry = VersionRegistry::open(dir.path());
        (dir, registry)
    }

    fn meta(id: &str, score: f64) -> ModelMetadata {
        ModelMetadata::new(id, "f1", score, Path::new("train.csv"), 0)
    }

    #[test]
    fn test_write_then_validate() {
        let (_dir, reg) = registry();
        let path = reg.write_version("1", b"blob", &meta("1", 0.5)).unwrap();
        assert!(path.ends_with("versions/1"));
        reg.validate_artifacts("1").unwrap();
        assert_eq!(reg.read_score("1").unwrap(), 0.5);
    }

    #[test]
    fn test_write_collision_is_configuration_error() {
        let (_dir, reg) = registry();
        reg.write_version("1", b"a", &meta("1", 0.5)).unwrap();
        let err = reg.write_version("1", b"b", &meta("1", 0.6)).unwrap_err();
        assert!(err.is_fatal());
        // First write is untouched.
        assert_eq!(reg.read_score("1").unwrap(), 0.5);
    }

    #[test]
    fn test_write_rejects_mismatched_metadata() {
        let (_dir, reg) = registry();
        let err = reg.write_version("1", b"a", &meta("2", 0.5)).unwrap_err();
        assert!(matches!(err, RegistryError::Configuration(_)));
        assert!(!reg.layout().version_dir("1").exists());
    }

    #[test]
    fn test_validate_missing_artifact() {
        let (_dir, reg) = registry();
        let dir = reg.layout().version_dir("7");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(METADATA_FILE), meta("7", 0.1).to_json().unwrap()).unwrap();
        assert!(reg.validate_artifacts("7").unwrap_err().is_not_found());
    }

    #[test]
    fn test_promote_incomplete_is_validation_failed() {
        let (_dir, reg) = registry();
        let err = reg.promote("404").unwrap_err();
        assert!(matches!(err, RegistryError::ValidationFailed { .. }));
        assert_eq!(reg.read_current().unwrap(), None);
    }

    #[test]
    fn test_promote_rejects_path_traversal() {
        let (_dir, reg) = registry();
        let err = reg.promote("../versions").unwrap_err();
        assert!(matches!(err, RegistryError::ValidationFailed { .. }));
    }

    #[test]
    fn test_read_score_corrupt_metadata() {
        let (_dir, reg) = registry();
        let dir = reg.layout().version_dir("3");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(ARTIFACT_FILE), b"x").unwrap();
        fs::write(dir.join(METADATA_FILE), b"{not json").unwrap();
        assert!(matches!(reg.read_score("3"), Err(RegistryError::Corrupt { .. })));
    }

    #[test]
    fn test_current_score_none_when_pointer_dangles() {
        let (_dir, reg) = registry();
        fs::create_dir_all(reg.layout().root()).unwrap();
        fs::write(reg.layout().pointer_path(), "999\n").unwrap();
        assert_eq!(reg.read_current_score().unwrap(), None);
    }

    #[test]
    fn test_rollback_returns_previous() {
        let (_dir, reg) = registry();
        reg.write_version("1", b"a", &meta("1", 0.5)).unwrap();
        reg.write_version("2", b"b", &meta("2", 0.7)).unwrap();
        reg.promote("1").unwrap();
        reg.promote("2").unwrap();

        let previous = reg.rollback("1").unwrap();
        assert_eq!(previous.as_deref(), Some("2"));
        assert_eq!(reg.read_current().unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_list_versions_sorted_and_skips_hidden() {
        let (_dir, reg) = registry();
        for id in ["10", "9", "100"] {
            reg.write_version(id, b"a", &meta(id, 0.5)).unwrap();
        }
        fs::create_dir_all(reg.layout().versions_dir().join(".staging")).unwrap();
        assert_eq!(reg.list_versions().unwrap(), vec!["9", "10", "100"]);
    }

    #[test]
    fn test_describe_marks_current() {
        let (_dir, reg) = registry();
        reg.write_version("1", b"a", &meta("1", 0.5)).unwrap();
        reg.write_version("2", b"a", &meta("2", 0.4)).unwrap();
        reg.promote("1").unwrap();

        let infos = reg.describe_versions().unwrap();
        assert_eq!(infos.len(), 2);
        assert!(infos[0].is_current && infos[0].complete);
        assert_eq!(infos[1].score, Some(0.4));
        assert!(!infos[1].is_current);
    }

    #[test]
    fn test_unreadable_pointer_is_not_a_previous_version() {
        let (_dir, reg) = registry();
        fs::create_dir_all(reg.layout().pointer_path()).unwrap();
        assert!(reg.read_current().is_err());
        assert_eq!(reg.current_for_log(), None);
    }
}
