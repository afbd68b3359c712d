//! Human-readable report formatting.

use revive_core::{CompatibilityVerdict, PlanReport};

pub fn format_report(report: &PlanReport) -> String {
    let mut out = String::new();

    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str("║  Revive Compatibility Plan               ║\n");
    out.push_str("╠══════════════════════════════════════════╣\n");
    out.push_str(&format!("║  Database: {:<29}║\n", report.database_name));
    out.push_str(&format!("║  Nodes:    {:<29}║\n", report.node_count));
    out.push_str(&format!("║  Verdict:  {:<29}║\n", report.verdict.label()));
    out.push_str("╚══════════════════════════════════════════╝\n\n");

    if let CompatibilityVerdict::Incompatible { reason } = &report.verdict {
        out.push_str("❌ INCOMPATIBLE LAYOUT:\n\n");
        out.push_str(&format!("  {reason}\n\n"));
    }

    out.push_str("Revived layout:\n");
    let shard_count = display_or_unknown(report.shard_count.map(|n| n.to_string()));
    let catalog_path = display_or_unknown(report.catalog_path.clone());
    let data_path = display_or_unknown(report.data_path.clone());
    let depot_path = display_or_unknown(report.depot_path.clone());
    out.push_str(&format!("  shard count:  {shard_count}\n"));
    out.push_str(&format!("  catalog path: {catalog_path}\n"));
    out.push_str(&format!("  data path:    {data_path}\n"));
    out.push_str(&format!("  depot path:   {depot_path}\n\n"));

    if report.needs_update() {
        out.push_str("⚠️  TARGET SPEC CHANGES:\n\n");
        for c in &report.changes {
            out.push_str(&format!("  • {}: {:?} → {:?}\n", c.field, c.old, c.new));
        }
        out.push('\n');
    } else if report.verdict.is_compatible() {
        out.push_str("✅ Target spec already matches the revived database\n");
    }

    out
}

fn display_or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| "<unknown>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use revive_core::{SpecChange, SpecField};

    fn report(verdict: CompatibilityVerdict, changes: Vec<SpecChange>) -> PlanReport {
        PlanReport {
            database_name: "vertdb".to_string(),
            node_count: 3,
            verdict,
            shard_count: Some(6),
            catalog_path: Some("/data".to_string()),
            data_path: Some("/data".to_string()),
            depot_path: None,
            changes,
        }
    }

    #[test]
    fn lists_changes() {
        let out = format_report(&report(
            CompatibilityVerdict::Compatible,
            vec![SpecChange {
                field: SpecField::DepotPath,
                old: "/old".to_string(),
                new: "/depot".to_string(),
            }],
        ));
        assert!(out.contains("COMPATIBLE"));
        assert!(out.contains("depot path: \"/old\" → \"/depot\""));
        assert!(out.contains("depot path:   <unknown>"));
    }

    #[test]
    fn shows_incompatibility_reason() {
        let out = format_report(&report(
            CompatibilityVerdict::Incompatible {
                reason: "multiple hosts don't have common paths: /a and /b".to_string(),
            },
            vec![],
        ));
        assert!(out.contains("INCOMPATIBLE"));
        assert!(out.contains("/a and /b"));
        assert!(!out.contains("already matches"));
    }

    #[test]
    fn says_when_nothing_changes() {
        let out = format_report(&report(CompatibilityVerdict::Compatible, vec![]));
        assert!(out.contains("already matches"));
    }
}
