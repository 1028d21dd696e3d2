// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Which model directory should be served.
//!
//! Resolution is an ordered list of strategies tried in a fixed priority:
//! explicit sub-directory override, then the `CURRENT` pointer, then the
//! pre-versioning `production/` directory. The first strategy that matches
//! wins, whether or not its directory is complete; completeness is checked
//! when the model is loaded.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::registry::{read_pointer, RegistryError, RegistryLayout};

/// Where a resolved model directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Override,
    Pointer,
    Legacy,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Pointer => write!(f, "pointer"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// A resolved model reference. Two refs are equal iff they name the same
/// directory through the same strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub source: ModelSource,
    /// Version id for pointer refs, directory name otherwise.
    pub label: String,
    pub dir: PathBuf,
}

impl ModelRef {
    /// The registry version id, if this ref came from the pointer.
    pub fn version_id(&self) -> Option<&str> {
        match self.source {
            ModelSource::Pointer => Some(&self.label),
            _ => None,
        }
    }
}

/// One way of locating the model to serve.
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means "no match, try the next strategy".
    fn resolve(&self) -> Result<Option<ModelRef>, RegistryError>;
}

/// Fixed sub-directory of the artifacts root (`MODEL_SUBDIR`).
pub struct SubdirOverride {
    artifacts_dir: PathBuf,
    subdir: String,
}

impl SubdirOverride {
    pub fn new(artifacts_dir: impl Into<PathBuf>, subdir: impl Into<String>) -> Self {
        Self { artifacts_dir: artifacts_dir.into(), subdir: subdir.into() }
    }
}

impl ResolveStrategy for SubdirOverride {
    fn name(&self) -> &'static str {
        "subdir_override"
    }

    fn resolve(&self) -> Result<Option<ModelRef>, RegistryError> {
        if self.subdir.is_empty() {
            return Ok(None);
        }
        Ok(Some(ModelRef {
            source: ModelSource::Override,
            label: self.subdir.clone(),
            dir: self.artifacts_dir.join(&self.subdir),
        }))
    }
}

/// The registry's `CURRENT` pointer.
pub struct CurrentPointer {
    layout: RegistryLayout,
}

impl CurrentPointer {
    pub fn new(layout: RegistryLayout) -> Self {
        Self { layout }
    }
}

impl ResolveStrategy for CurrentPointer {
    fn name(&self) -> &'static str {
        "current_pointer"
    }

    fn resolve(&self) -> Result<Option<ModelRef>, RegistryError> {
        let version = match read_pointer(&self.layout.pointer_path())? {
            Some(v) => v,
            None => return Ok(None),
        };
        if !crate::registry::layout::is_valid_version_id(&version) {
            return Err(RegistryError::corrupt(
                self.layout.pointer_path(),
                format!("invalid version id {:?}", version),
            ));
        }
        Ok(Some(ModelRef {
            source: ModelSource::Pointer,
            dir: self.layout.version_dir(&version),
            label: version,
        }))
    }
}

/// `<models>/production`, consulted only when nothing above matched.
pub struct LegacyLocation {
    dir: PathBuf,
}

impl LegacyLocation {
    pub fn new(layout: &RegistryLayout) -> Self {
        Self { dir: layout.legacy_dir() }
    }
}

impl ResolveStrategy for LegacyLocation {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn resolve(&self) -> Result<Option<ModelRef>, RegistryError> {
        if !self.dir.exists() {
            return Ok(None);
        }
        Ok(Some(ModelRef {
            source: ModelSource::Legacy,
            label: crate::registry::layout::LEGACY_DIR.to_string(),
            dir: self.dir.clone(),
        }))
    }
}

/// Ordered resolution strategies.
pub struct Resolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Resolver {
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Standard order for an artifacts root: override (if given), pointer,
    /// legacy.
    pub fn for_artifacts(artifacts_dir: &Path, subdir: Option<&str>) -> Self {
        let layout = RegistryLayout::under_artifacts(artifacts_dir);
        let mut strategies: Vec<Box<dyn ResolveStrategy>> = Vec::with_capacity(3);
        if let Some(subdir) = subdir.filter(|s| !s.is_empty()) {
            strategies.push(Box::new(SubdirOverride::new(artifacts_dir, subdir)));
        }
        strategies.push(Box::new(CurrentPointer::new(layout.clone())));
        strategies.push(Box::new(LegacyLocation::new(&layout)));
        Self::new(strategies)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// First match in priority order, or `None` if nothing matched.
    pub fn resolve(&self) -> Result<Option<ModelRef>, RegistryError> {
        for strategy in &self.strategies {
            if let Some(found) = strategy.resolve()? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}
