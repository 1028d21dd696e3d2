// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! The `CURRENT` pointer: read, and atomic replace via rename.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::RegistryError;
use super::layout::RegistryLayout;

/// Read the pointer file. Missing, empty or whitespace-only means `None`.
pub fn read_pointer(path: &Path) -> Result<Option<String>, RegistryError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let version = text.trim();
            if version.is_empty() {
                Ok(None)
            } else {
                Ok(Some(version.to_string()))
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RegistryError::io(path, e)),
    }
}

/// Point `CURRENT` at `version_id`.
///
/// The value is written and synced to a temp file scoped to this process
/// and instant, then renamed over `CURRENT`. Readers see the old or the new
/// value, never a partial file. Any failure before the rename leaves the
/// previous pointer untouched.
pub fn swap_pointer(layout: &RegistryLayout, version_id: &str) -> Result<(), RegistryError> {
    let root = layout.root();
    fs::create_dir_all(root).map_err(|e| RegistryError::io(root, e))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let tmp_path = layout.pointer_tmp_path(std::process::id(), nanos);
    let pointer_path = layout.pointer_path();

    if let Err(e) = write_synced(&tmp_path, format!("{}\n", version_id).as_bytes()) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp_path, &pointer_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(RegistryError::io(&pointer_path, e));
    }

    sync_dir(root);
    Ok(())
}

/// Create `path` exclusively, write `bytes` and fsync.
pub(crate) fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), RegistryError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| RegistryError::io(path, e))?;
    file.write_all(bytes).map_err(|e| RegistryError::io(path, e))?;
    file.sync_all().map_err(|e| RegistryError::io(path, e))
}

/// Best-effort directory fsync so the rename survives a crash.
pub(crate) fn sync_dir(dir: &Path) {
    if cfg!(unix) {
        if let Ok(handle) = fs::File::open(dir) {
            let _ = handle.sync_all();
        }
    }
}
