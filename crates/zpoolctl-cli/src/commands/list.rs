use super::{json_pretty, Provider, EXIT_SUCCESS};

pub fn run(provider: &Provider, json: bool) -> Result<u8, String> {
    let pools = provider.instances().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&pools)?);
    } else if pools.is_empty() {
        println!("no pools available");
    } else {
        for pool in &pools {
            println!("{pool}");
        }
    }
    Ok(EXIT_SUCCESS)
}
