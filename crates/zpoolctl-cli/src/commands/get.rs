use super::{Provider, EXIT_SUCCESS};
use zpoolctl_core::Field;

pub fn run(provider: &mut Provider, pool: &str, field: &str, json: bool) -> Result<u8, String> {
    let field: Field = field.parse()?;
    let value = provider.get(pool, field).map_err(|e| e.to_string())?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "pool": pool, "field": field, "value": value })
        );
    } else {
        println!("{value}");
    }
    Ok(EXIT_SUCCESS)
}
