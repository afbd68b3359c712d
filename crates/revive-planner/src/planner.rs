//! Revive planner — checks that a revived database's layout can be managed
//! declaratively and rewrites the target spec to match it.

use revive_core::{
    CompatibilityVerdict, DepotVolumeKind, PlanReport, SpecChange, SpecField, TargetSpec,
};
use tracing::{Span, info, info_span, warn};

use crate::common_path::NodePathConvention;
use crate::error::{ParseResult, PlanResult};
use crate::parsers::ClusterConfigParser;

/// Common paths computed from the parsed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CommonPaths {
    catalog: String,
    data: String,
    depot: String,
}

pub struct Planner {
    parser: Box<dyn ClusterConfigParser>,
    span: Span,
}

impl Planner {
    pub fn new(parser: Box<dyn ClusterConfigParser>) -> Self {
        Self::with_span(parser, info_span!("revive_planner"))
    }

    /// Build a planner that logs inside the given span.
    pub fn with_span(parser: Box<dyn ClusterConfigParser>, span: Span) -> Self {
        Self { parser, span }
    }

    /// Feed the revive payload to the underlying parser.
    pub fn parse(&mut self, payload: &str) -> ParseResult<()> {
        let _enter = self.span.enter();
        self.parser.parse(payload)
    }

    pub fn parser(&self) -> &dyn ClusterConfigParser {
        self.parser.as_ref()
    }

    /// Check that depot, catalog and data paths are each homogeneous
    /// across all nodes.
    pub fn is_compatible(&self) -> CompatibilityVerdict {
        let _enter = self.span.enter();
        match self.check_compatible_paths() {
            Ok(()) => CompatibilityVerdict::Compatible,
            Err(e) => CompatibilityVerdict::Incompatible {
                reason: e.to_string(),
            },
        }
    }

    fn check_compatible_paths(&self) -> PlanResult<()> {
        let conv = self.convention()?;
        conv.common_path(&self.parser.depot_paths(), None)?;
        let catalog = conv.common_path(&self.parser.catalog_paths(), None)?;
        // Some revives recorded the catalog path as a node's data path. The
        // catalog still knows the real data location, so those nodes are
        // tolerated.
        conv.common_path(&self.parser.data_paths(), Some(&catalog))?;
        Ok(())
    }

    /// Rewrite `target` so it matches the revived database. Returns true if
    /// any field changed.
    ///
    /// All common paths are computed before `target` is touched: on error
    /// the target is left as it was.
    pub fn apply_changes(&self, target: &mut TargetSpec) -> PlanResult<bool> {
        let _enter = self.span.enter();
        let (updated, changes) = self.reconcile(target)?;
        for change in &changes {
            info!(
                db = %self.parser.database_name(),
                old = %change.old,
                new = %change.new,
                "{} has to change to match revive output",
                change.field
            );
        }
        *target = updated;
        Ok(!changes.is_empty())
    }

    /// Changes `apply_changes` would make, without touching `target`.
    pub fn plan_changes(&self, target: &TargetSpec) -> PlanResult<Vec<SpecChange>> {
        let _enter = self.span.enter();
        self.reconcile(target).map(|(_, changes)| changes)
    }

    /// Compatibility verdict plus the pending spec changes, in one report.
    pub fn report(&self, target: &TargetSpec) -> PlanReport {
        let verdict = self.is_compatible();
        let paths = self.common_paths().ok();
        let changes = if verdict.is_compatible() {
            self.plan_changes(target).unwrap_or_default()
        } else {
            Vec::new()
        };

        PlanReport {
            database_name: self.parser.database_name().to_string(),
            node_count: self.parser.description().nodes.len(),
            verdict,
            shard_count: self.parser.num_shards().ok(),
            catalog_path: paths.as_ref().map(|p| p.catalog.clone()),
            data_path: paths.as_ref().map(|p| p.data.clone()),
            depot_path: paths.map(|p| p.depot),
            changes,
        }
    }

    fn convention(&self) -> PlanResult<NodePathConvention> {
        NodePathConvention::new(self.parser.database_name())
    }

    fn common_paths(&self) -> PlanResult<CommonPaths> {
        let conv = self.convention()?;
        let catalog = conv.common_path(&self.parser.catalog_paths(), None)?;
        let data = conv.common_path(&self.parser.data_paths(), Some(&catalog))?;
        let depot = conv.common_path(&self.parser.depot_paths(), None)?;
        Ok(CommonPaths {
            catalog,
            data,
            depot,
        })
    }

    /// Compute the reconciled spec and the list of field changes.
    fn reconcile(&self, target: &TargetSpec) -> PlanResult<(TargetSpec, Vec<SpecChange>)> {
        let mut spec = target.clone();
        let mut changes = Vec::new();

        match self.parser.num_shards() {
            Ok(shards) if shards != spec.shard_count => {
                changes.push(SpecChange {
                    field: SpecField::ShardCount,
                    old: spec.shard_count.to_string(),
                    new: shards.to_string(),
                });
                spec.shard_count = shards;
            }
            Ok(_) => {}
            Err(e) => {
                // Shard count can't be validated from this payload; carry on
                // with the paths.
                warn!(error = %e, "failed to read shard count from revive output");
            }
        }

        let paths = self.common_paths()?;

        if paths.catalog != spec.effective_catalog_path() {
            changes.push(SpecChange {
                field: SpecField::CatalogPath,
                old: spec.effective_catalog_path().to_string(),
                new: paths.catalog.clone(),
            });
            spec.local.catalog_path = paths.catalog;
        }

        if paths.data != spec.local.data_path {
            changes.push(SpecChange {
                field: SpecField::DataPath,
                old: spec.local.data_path.clone(),
                new: paths.data.clone(),
            });
            spec.local.data_path = paths.data;
        }

        if paths.depot != spec.local.depot_path {
            changes.push(SpecChange {
                field: SpecField::DepotPath,
                old: spec.local.depot_path.clone(),
                new: paths.depot.clone(),
            });
            spec.local.depot_path = paths.depot;
        }

        // An emptyDir depot is its own mount, it can't share a directory
        // with catalog or data.
        if spec.is_depot_volume_empty_dir() && !spec.is_depot_path_unique() {
            changes.push(SpecChange {
                field: SpecField::DepotVolume,
                old: DepotVolumeKind::EmptyDir.to_string(),
                new: DepotVolumeKind::PersistentVolume.to_string(),
            });
            spec.local.depot_volume = DepotVolumeKind::PersistentVolume;
        }

        Ok((spec, changes))
    }
}
