use super::{
    colorize_outcome, json_pretty, load_manifest, spin_fail, spin_ok, spinner, Provider,
    EXIT_SUCCESS,
};
use std::path::Path;
use zpoolctl_core::ApplyOutcome;

fn describe(outcome: &ApplyOutcome) -> String {
    match outcome {
        ApplyOutcome::Created => colorize_outcome("created"),
        ApplyOutcome::Unchanged => colorize_outcome("unchanged"),
        ApplyOutcome::Updated(fields) => format!(
            "{} ({})",
            colorize_outcome("updated"),
            fields
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Apply every pool in order, stopping at the first failure.
pub fn run(provider: &mut Provider, manifest: &Path, json: bool) -> Result<u8, String> {
    let descs = load_manifest(manifest)?;
    let mut results = Vec::with_capacity(descs.len());

    for desc in &descs {
        let pb = (!json).then(|| spinner(&format!("applying {}...", desc.pool)));
        match provider.apply(desc) {
            Ok(outcome) => {
                if let Some(pb) = &pb {
                    spin_ok(pb, &format!("pool {}: {}", desc.pool, describe(&outcome)));
                }
                results.push(serde_json::json!({ "pool": desc.pool, "result": outcome }));
            }
            Err(e) => {
                if let Some(pb) = &pb {
                    spin_fail(pb, &format!("pool {}", desc.pool));
                }
                return Err(e.to_string());
            }
        }
    }

    if json {
        println!("{}", json_pretty(&results)?);
    }
    Ok(EXIT_SUCCESS)
}
