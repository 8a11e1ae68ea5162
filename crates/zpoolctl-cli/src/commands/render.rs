use super::{json_pretty, load_manifest, EXIT_SUCCESS};
use std::path::Path;
use zpoolctl_core::create_command;

pub fn run(manifest: &Path, json: bool) -> Result<u8, String> {
    let descs = load_manifest(manifest)?;
    if json {
        let rendered: Vec<_> = descs
            .iter()
            .map(|d| serde_json::json!({ "pool": d.pool, "args": create_command(d) }))
            .collect();
        println!("{}", json_pretty(&rendered)?);
    } else {
        for desc in &descs {
            println!("zpool {}", create_command(desc).join(" "));
        }
    }
    Ok(EXIT_SUCCESS)
}
