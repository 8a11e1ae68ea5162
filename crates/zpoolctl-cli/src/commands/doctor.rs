use super::{EXIT_FAILURE, EXIT_SUCCESS};
use zpoolctl_runtime::{check_prereqs, format_missing, select_backend, BackendConfig};

pub fn run(backend: &str, config: &BackendConfig, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    checks.push(Check::info(
        "platform",
        &format!("Platform: {}", config.platform()),
    ));

    if backend == "system" {
        check_tools(config, &mut checks, &mut all_pass);
    } else {
        checks.push(Check::info(
            "tools",
            &format!("Backend '{backend}' does not use external tools"),
        ));
    }

    check_backend(backend, config, &mut checks, &mut all_pass);

    print_results(&checks, all_pass, json_output)
}

fn check_tools(config: &BackendConfig, checks: &mut Vec<Check>, all_pass: &mut bool) {
    let missing = check_prereqs(config);
    if missing.is_empty() {
        checks.push(Check::pass("tools", "zpool tooling found"));
    } else {
        *all_pass = false;
        checks.push(Check::fail("tools", &format_missing(&missing)));
    }
}

fn check_backend(
    backend: &str,
    config: &BackendConfig,
    checks: &mut Vec<Check>,
    all_pass: &mut bool,
) {
    let backend = match select_backend(backend, config) {
        Ok(b) => b,
        Err(e) => {
            *all_pass = false;
            checks.push(Check::fail("backend", &e.to_string()));
            return;
        }
    };
    match backend.zpool(&zpoolctl_core::command::list_command()) {
        Ok(out) => {
            let pools = zpoolctl_runtime::parse_pool_list(&out).len();
            checks.push(Check::pass(
                "backend",
                &format!("Backend '{}' answers ({pools} pools)", backend.name()),
            ));
        }
        Err(e) => checks.push(Check::warn(
            "backend",
            &format!("Backend '{}' cannot list pools: {e}", backend.name()),
        )),
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
        );
    } else {
        println!("zpoolctl doctor\n");
        for check in checks {
            let icon = match check.status {
                "pass" => "✓",
                "fail" => "✗",
                "warn" => "⚠",
                _ => "ℹ",
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: &'static str,
    status: &'static str,
    message: String,
}

impl Check {
    fn new(name: &'static str, status: &'static str, message: &str) -> Self {
        Self {
            name,
            status,
            message: message.to_owned(),
        }
    }

    fn pass(name: &'static str, message: &str) -> Self {
        Self::new(name, "pass", message)
    }

    fn fail(name: &'static str, message: &str) -> Self {
        Self::new(name, "fail", message)
    }

    fn warn(name: &'static str, message: &str) -> Self {
        Self::new(name, "warn", message)
    }

    fn info(name: &'static str, message: &str) -> Self {
        Self::new(name, "info", message)
    }
}
