//! End-to-end planner tests over captured `--display-only` payloads.

use revive_core::{DepotVolumeKind, LocalStorage, SpecField, TargetSpec};
use revive_planner::{PayloadFormat, Planner, parser_for, report};

const ADMINTOOLS_OUTPUT: &str = include_str!("fixtures/admintools_display_only.txt");
const VCLUSTER_OUTPUT: &str = include_str!("fixtures/vcluster_display_only.json");

fn planner(format: PayloadFormat, payload: &str) -> Planner {
    let mut planner = Planner::new(parser_for(format));
    planner.parse(payload).unwrap();
    planner
}

fn spec(catalog: &str, data: &str, depot: &str, shards: u32) -> TargetSpec {
    TargetSpec {
        shard_count: shards,
        local: LocalStorage {
            catalog_path: catalog.to_string(),
            data_path: data.to_string(),
            depot_path: depot.to_string(),
            depot_volume: DepotVolumeKind::PersistentVolume,
        },
    }
}

#[test]
fn admintools_payload_is_compatible() {
    let planner = planner(PayloadFormat::TextTool, ADMINTOOLS_OUTPUT);
    assert!(planner.is_compatible().is_compatible());
    assert_eq!(planner.parser().database_name(), "vertdb");
    assert_eq!(planner.parser().num_shards().unwrap(), 12);
}

#[test]
fn admintools_payload_tolerates_data_path_on_catalog() {
    let planner = planner(PayloadFormat::TextTool, ADMINTOOLS_OUTPUT);
    let mut target = spec("/catalog", "/data", "/depot", 6);

    assert!(planner.apply_changes(&mut target).unwrap());
    assert_eq!(target.shard_count, 12);
    assert_eq!(target.local.catalog_path, "/home/dbadmin");
    assert_eq!(target.local.data_path, "/data");
    assert_eq!(target.local.depot_path, "/depot");

    // A second pass finds nothing left to do.
    assert!(!planner.apply_changes(&mut target).unwrap());
}

#[test]
fn vcluster_payload_reconciles_target() {
    let planner = planner(PayloadFormat::RpcTool, VCLUSTER_OUTPUT);
    assert!(planner.is_compatible().is_compatible());

    let mut target = spec("/catalog", "/data", "/somewhere-else", 6);
    let changes = planner.plan_changes(&target).unwrap();
    let fields: Vec<_> = changes.iter().map(|c| c.field).collect();
    assert_eq!(fields, vec![SpecField::CatalogPath, SpecField::DepotPath]);

    assert!(planner.apply_changes(&mut target).unwrap());
    assert_eq!(target, spec("/data", "/data", "/depot", 6));
}

#[test]
fn vcluster_empty_dir_depot_is_kept_once_depot_path_is_reconciled() {
    let planner = planner(PayloadFormat::RpcTool, VCLUSTER_OUTPUT);
    let mut target = spec("/data", "/data", "/data", 6);
    target.local.depot_volume = DepotVolumeKind::EmptyDir;

    assert!(planner.apply_changes(&mut target).unwrap());
    assert_eq!(target.local.depot_path, "/depot");
    assert_eq!(target.local.depot_volume, DepotVolumeKind::EmptyDir);
}

#[test]
fn report_renders_for_both_formats() {
    for (format, payload) in [
        (PayloadFormat::TextTool, ADMINTOOLS_OUTPUT),
        (PayloadFormat::RpcTool, VCLUSTER_OUTPUT),
    ] {
        let planner = planner(format, payload);
        let plan = planner.report(&spec("/a", "/b", "/c", 1));
        assert!(plan.verdict.is_compatible());
        assert!(plan.needs_update());
        let text = report::format_report(&plan);
        assert!(text.contains("vertdb"));
        assert!(text.contains("TARGET SPEC CHANGES"));
    }
}

#[test]
fn mismatched_node_paths_are_reported() {
    let broken = VCLUSTER_OUTPUT.replace(
        "/depot/vertdb/v_vertdb_node0002_depot",
        "/other/vertdb/v_vertdb_node0002_depot",
    );
    let planner = planner(PayloadFormat::RpcTool, &broken);
    let plan = planner.report(&spec("/data", "/data", "/depot", 6));
    assert!(!plan.verdict.is_compatible());
    assert!(plan.changes.is_empty());
    assert!(plan.depot_path.is_none());

    let mut target = spec("/data", "/data", "/depot", 6);
    assert!(planner.apply_changes(&mut target).is_err());
}
