use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};
use revive_core::{CompatibilityVerdict, PlanReport, TargetSpec};
use revive_planner::{PayloadFormat, Planner, parser_for, report};

pub fn check(input: &str, format: PayloadFormat, output: &str) -> anyhow::Result<()> {
    let planner = load_planner(input, format)?;
    let verdict = planner.is_compatible();

    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&verdict)?),
        _ => match &verdict {
            CompatibilityVerdict::Compatible => {
                println!("✓ {} layout is compatible", planner.parser().database_name())
            }
            CompatibilityVerdict::Incompatible { reason } => println!("✗ {reason}"),
        },
    }

    if let CompatibilityVerdict::Incompatible { reason } = verdict {
        bail!("revive is not compatible: {reason}");
    }
    Ok(())
}

pub fn plan(
    input: &str,
    format: PayloadFormat,
    spec_path: &str,
    output: &str,
) -> anyhow::Result<()> {
    let planner = load_planner(input, format)?;
    let target = load_spec(spec_path)?;
    let plan = planner.report(&target);
    print_report(&plan, output)
}

pub fn apply(
    input: &str,
    format: PayloadFormat,
    spec_path: &str,
    write: bool,
) -> anyhow::Result<()> {
    let planner = load_planner(input, format)?;
    let (updated, target) = apply_to_spec(&planner, Path::new(spec_path), write)?;

    print!("{}", target.to_toml_string()?);
    if updated && write {
        eprintln!("✓ Updated {spec_path}");
    } else if !updated {
        eprintln!("✓ {spec_path} already matches the revived database");
    }
    Ok(())
}

/// Reconcile the spec stored at `spec_path`, writing it back when asked.
fn apply_to_spec(
    planner: &Planner,
    spec_path: &Path,
    write: bool,
) -> anyhow::Result<(bool, TargetSpec)> {
    let verdict = planner.is_compatible();
    if let CompatibilityVerdict::Incompatible { reason } = verdict {
        bail!("revive is not compatible: {reason}");
    }

    let mut target = TargetSpec::from_file(spec_path)
        .with_context(|| format!("failed to load target spec {}", spec_path.display()))?;
    let updated = planner.apply_changes(&mut target)?;

    if updated && write {
        std::fs::write(spec_path, target.to_toml_string()?)
            .with_context(|| format!("failed to write {}", spec_path.display()))?;
    }
    Ok((updated, target))
}

fn print_report(plan: &PlanReport, output: &str) -> anyhow::Result<()> {
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(plan)?),
        _ => println!("{}", report::format_report(plan)),
    }
    Ok(())
}

fn load_spec(spec_path: &str) -> anyhow::Result<TargetSpec> {
    TargetSpec::from_file(Path::new(spec_path))
        .with_context(|| format!("failed to load target spec {spec_path}"))
}

fn load_planner(input: &str, format: PayloadFormat) -> anyhow::Result<Planner> {
    let payload = read_payload(input)?;
    let mut planner = Planner::new(parser_for(format));
    planner
        .parse(&payload)
        .with_context(|| format!("failed to parse {} revive output", format.label()))?;
    Ok(planner)
}

fn read_payload(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}
