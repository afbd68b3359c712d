//! Shared types used across the revive planner crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::TargetSpec;

/// Usage code attached to a storage location in the cluster description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageUsage {
    /// Data and temp storage.
    DataTemp,
    /// User-created storage location.
    User,
    /// Depot cache.
    Depot,
}

impl StorageUsage {
    pub const DATA_TEMP_CODE: i64 = 3;
    pub const USER_CODE: i64 = 4;
    pub const DEPOT_CODE: i64 = 5;

    /// Map a raw usage code. Codes the planner does not track (communal
    /// storage, for one) map to `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            Self::DATA_TEMP_CODE => Some(StorageUsage::DataTemp),
            Self::USER_CODE => Some(StorageUsage::User),
            Self::DEPOT_CODE => Some(StorageUsage::Depot),
            _ => None,
        }
    }
}

/// Storage layout of a single database node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub catalog_path: String,
    pub data_paths: BTreeSet<String>,
    pub depot_paths: BTreeSet<String>,
}

impl NodeInfo {
    pub fn new(name: &str, catalog_path: &str) -> Self {
        Self {
            name: name.to_string(),
            catalog_path: catalog_path.to_string(),
            ..Default::default()
        }
    }

    /// Record a storage location under the set its usage belongs to.
    /// User storage locations are not part of the managed layout.
    pub fn add_storage(&mut self, path: &str, usage: StorageUsage) {
        match usage {
            StorageUsage::DataTemp => {
                self.data_paths.insert(path.to_string());
            }
            StorageUsage::Depot => {
                self.depot_paths.insert(path.to_string());
            }
            StorageUsage::User => {}
        }
    }
}

/// Normalized view of a revived database, independent of which admin
/// tool produced the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescription {
    pub database_name: String,
    /// Logical shard count, `None` when the payload did not carry a
    /// usable value.
    pub shard_count: Option<u32>,
    pub nodes: Vec<NodeInfo>,
}

impl ClusterDescription {
    pub fn catalog_paths(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.catalog_path.clone()).collect()
    }

    pub fn data_paths(&self) -> Vec<String> {
        self.nodes
            .iter()
            .flat_map(|n| n.data_paths.iter().cloned())
            .collect()
    }

    pub fn depot_paths(&self) -> Vec<String> {
        self.nodes
            .iter()
            .flat_map(|n| n.depot_paths.iter().cloned())
            .collect()
    }

    /// Build the description that a cluster generated from `target` would
    /// report: every node uses the generated per-node path convention.
    pub fn synthesize(target: &TargetSpec, db_name: &str, node_count: usize) -> Self {
        let nodes = (1..=node_count)
            .map(|index| {
                let name = node_name(db_name, index);
                let mut node = NodeInfo::new(
                    &name,
                    &format!("{}/{db_name}/{name}_catalog", target.effective_catalog_path()),
                );
                node.add_storage(
                    &format!("{}/{db_name}/{name}_data", target.local.data_path),
                    StorageUsage::DataTemp,
                );
                node.add_storage(
                    &format!("{}/{db_name}/{name}_depot", target.local.depot_path),
                    StorageUsage::Depot,
                );
                node
            })
            .collect();

        ClusterDescription {
            database_name: db_name.to_string(),
            shard_count: Some(target.shard_count),
            nodes,
        }
    }
}

/// Prefix shared by every generated node name of a database.
pub fn node_prefix(db_name: &str) -> String {
    format!("v_{}", db_name.to_lowercase())
}

/// Generated node name, e.g. `v_vertdb_node0001`. Indexes start at 1.
pub fn node_name(db_name: &str, index: usize) -> String {
    format!("{}_node{index:04}", node_prefix(db_name))
}

/// Outcome of the compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompatibilityVerdict {
    Compatible,
    Incompatible { reason: String },
}

impl CompatibilityVerdict {
    pub fn is_compatible(&self) -> bool {
        matches!(self, CompatibilityVerdict::Compatible)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompatibilityVerdict::Compatible => "COMPATIBLE",
            CompatibilityVerdict::Incompatible { .. } => "INCOMPATIBLE",
        }
    }
}

/// Target spec field the planner may rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecField {
    ShardCount,
    CatalogPath,
    DataPath,
    DepotPath,
    DepotVolume,
}

impl SpecField {
    pub fn label(&self) -> &'static str {
        match self {
            SpecField::ShardCount => "shard count",
            SpecField::CatalogPath => "catalog path",
            SpecField::DataPath => "data path",
            SpecField::DepotPath => "depot path",
            SpecField::DepotVolume => "depot volume",
        }
    }
}

impl fmt::Display for SpecField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single field rewrite applied (or pending) on the target spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecChange {
    pub field: SpecField,
    pub old: String,
    pub new: String,
}

/// Planner report for one revive payload against one target spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub database_name: String,
    pub node_count: usize,
    pub verdict: CompatibilityVerdict,
    pub shard_count: Option<u32>,
    pub catalog_path: Option<String>,
    pub data_path: Option<String>,
    pub depot_path: Option<String>,
    pub changes: Vec<SpecChange>,
}

impl PlanReport {
    pub fn needs_update(&self) -> bool {
        !self.changes.is_empty()
    }
}
