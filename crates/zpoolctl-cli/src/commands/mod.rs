pub mod apply;
pub mod completions;
pub mod destroy;
pub mod doctor;
pub mod get;
pub mod list;
pub mod man_pages;
pub mod plan;
pub mod render;
pub mod set;
pub mod status;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use zpoolctl_core::PoolProvider;
use zpoolctl_runtime::{select_backend, BackendConfig, ZpoolBackend};
use zpoolctl_schema::{parse_manifest_file, PoolDescription};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_DRIFT: u8 = 3;

pub type Provider = PoolProvider<dyn ZpoolBackend>;

pub fn open(backend: &str, config: &BackendConfig) -> Result<Provider, String> {
    let backend = select_backend(backend, config).map_err(|e| e.to_string())?;
    Ok(PoolProvider::new(backend))
}

/// Parse and validate a manifest into pool descriptions.
pub fn load_manifest(path: &Path) -> Result<Vec<PoolDescription>, String> {
    parse_manifest_file(path)
        .and_then(|m| m.normalize())
        .map_err(|e| format!("manifest error: {e}"))
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Marker for one line of a drift listing.
pub fn colorize_change(mutable: bool) -> String {
    use console::Style;
    if mutable {
        Style::new().yellow().apply_to("~").to_string()
    } else {
        Style::new().red().bold().apply_to("!").to_string()
    }
}

pub fn colorize_outcome(outcome: &str) -> String {
    use console::Style;
    match outcome {
        "created" => Style::new().green().apply_to(outcome).to_string(),
        "updated" => Style::new().yellow().apply_to(outcome).to_string(),
        "unchanged" => Style::new().dim().apply_to(outcome).to_string(),
        "absent" => Style::new().cyan().apply_to(outcome).to_string(),
        other => other.to_owned(),
    }
}
