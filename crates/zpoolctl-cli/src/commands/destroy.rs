use super::{spin_fail, spin_ok, spinner, Provider, EXIT_SUCCESS};

pub fn run(provider: &mut Provider, pool: &str, json: bool) -> Result<u8, String> {
    if !provider.exists(pool).map_err(|e| e.to_string())? {
        return Err(format!("pool '{pool}' does not exist"));
    }

    let pb = (!json).then(|| spinner(&format!("destroying {pool}...")));
    match provider.destroy(pool) {
        Ok(()) => {
            if let Some(pb) = &pb {
                spin_ok(pb, &format!("destroyed pool {pool}"));
            } else {
                println!("{}", serde_json::json!({ "pool": pool, "destroyed": true }));
            }
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            if let Some(pb) = &pb {
                spin_fail(pb, &format!("failed to destroy {pool}"));
            }
            Err(e.to_string())
        }
    }
}
