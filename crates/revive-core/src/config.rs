//! Target spec configuration (the declared cluster layout).
//!
//! The target spec is owned by the orchestrator. The planner reads it and
//! rewrites fields in place when the revived database disagrees with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Kind of volume backing the depot directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepotVolumeKind {
    /// Scratch volume that lives and dies with the pod.
    EmptyDir,
    /// Depot shares the persistent volume used for catalog and data.
    #[default]
    PersistentVolume,
}

impl DepotVolumeKind {
    pub fn label(&self) -> &'static str {
        match self {
            DepotVolumeKind::EmptyDir => "EmptyDir",
            DepotVolumeKind::PersistentVolume => "PersistentVolume",
        }
    }
}

impl fmt::Display for DepotVolumeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalStorage {
    /// Catalog directory. Older specs leave this empty, in which case the
    /// catalog shares the data path.
    #[serde(default)]
    pub catalog_path: String,
    #[serde(default)]
    pub data_path: String,
    #[serde(default)]
    pub depot_path: String,
    #[serde(default)]
    pub depot_volume: DepotVolumeKind,
}

/// Declared layout of the whole cluster: one path of each kind plus the
/// shard count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    #[serde(default)]
    pub shard_count: u32,
    #[serde(default)]
    pub local: LocalStorage,
}

impl LocalStorage {
    /// The catalog path actually in effect, falling back to the data path.
    pub fn effective_catalog_path(&self) -> &str {
        if self.catalog_path.is_empty() {
            &self.data_path
        } else {
            &self.catalog_path
        }
    }

    /// True when the depot path differs from both the catalog and data paths.
    pub fn is_depot_path_unique(&self) -> bool {
        self.depot_path != self.data_path && self.depot_path != self.effective_catalog_path()
    }
}

impl TargetSpec {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let spec: TargetSpec = toml::from_str(content)?;
        Ok(spec)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn effective_catalog_path(&self) -> &str {
        self.local.effective_catalog_path()
    }

    pub fn is_depot_path_unique(&self) -> bool {
        self.local.is_depot_path_unique()
    }

    pub fn is_depot_volume_empty_dir(&self) -> bool {
        self.local.depot_volume == DepotVolumeKind::EmptyDir
    }
}
