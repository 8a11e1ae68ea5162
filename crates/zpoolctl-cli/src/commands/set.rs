use super::{Provider, EXIT_SUCCESS};
use zpoolctl_core::{Field, FieldValue};

pub fn run(
    provider: &mut Provider,
    pool: &str,
    field: &str,
    value: &str,
    json: bool,
) -> Result<u8, String> {
    let field: Field = field.parse()?;
    if !provider.exists(pool).map_err(|e| e.to_string())? {
        return Err(format!("pool '{pool}' does not exist"));
    }
    let value = if field.is_mutable() {
        FieldValue::Scalar(value.to_owned())
    } else {
        FieldValue::Groups(vec![value.to_owned()])
    };
    provider
        .set(pool, field, &value)
        .map_err(|e| e.to_string())?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "pool": pool, "field": field, "value": value })
        );
    } else {
        println!("set {field}={value} on {pool}");
    }
    Ok(EXIT_SUCCESS)
}
