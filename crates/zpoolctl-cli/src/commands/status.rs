use super::{json_pretty, Provider, EXIT_SUCCESS};
use zpoolctl_core::CoreError;

pub fn run(provider: &mut Provider, pool: &str, json: bool) -> Result<u8, String> {
    let topology = provider.current_pool(pool).map_err(|e| e.to_string())?;
    if topology.is_absent() {
        return Err(CoreError::PoolNotFound(pool.to_owned()).to_string());
    }

    if json {
        println!("{}", json_pretty(topology)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("pool: {pool}");
    if let Some(parity) = topology.raid_parity {
        println!("raid_parity: {parity}");
    }
    if topology.groups.is_empty() {
        println!("  (no vdevs reported)");
    }
    for (category, groups) in &topology.groups {
        for group in groups {
            println!("  {category:<8} {group}");
        }
    }
    Ok(EXIT_SUCCESS)
}
