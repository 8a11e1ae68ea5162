use super::{
    colorize_change, colorize_outcome, json_pretty, load_manifest, Provider, EXIT_DRIFT,
    EXIT_SUCCESS,
};
use std::path::Path;
use zpoolctl_core::DriftReport;

pub fn run(
    provider: &mut Provider,
    manifest: &Path,
    check: bool,
    json: bool,
) -> Result<u8, String> {
    let descs = load_manifest(manifest)?;
    let mut reports = Vec::with_capacity(descs.len());
    for desc in &descs {
        reports.push(provider.diff(desc).map_err(|e| e.to_string())?);
    }

    if json {
        println!("{}", json_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    let drifted = reports.iter().any(DriftReport::has_drift);
    Ok(if check && drifted { EXIT_DRIFT } else { EXIT_SUCCESS })
}

fn print_report(report: &DriftReport) {
    if !report.exists {
        println!("pool {}: {} (will be created)", report.pool, colorize_outcome("absent"));
    } else if report.entries.is_empty() {
        println!("pool {}: {}", report.pool, colorize_outcome("unchanged"));
    } else {
        println!("pool {}: drift detected", report.pool);
        for entry in &report.entries {
            let note = if entry.mutable { "" } else { " (cannot be changed)" };
            println!(
                "  {} {}: {} -> {}{note}",
                colorize_change(entry.mutable),
                entry.field,
                entry.current,
                entry.desired
            );
        }
    }
}
