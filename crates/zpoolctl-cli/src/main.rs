mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_DRIFT, EXIT_FAILURE, EXIT_MANIFEST_ERROR};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use zpoolctl_runtime::BackendConfig;

#[derive(Debug, Parser)]
#[command(
    name = "zpoolctl",
    version,
    about = "Declarative ZFS pool topology management on top of zpool(8)"
)]
struct Cli {
    /// Backend that executes zpool commands: `system` or `mock`.
    #[arg(long, default_value = "system", global = true)]
    backend: String,

    /// Path to the backend configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List imported pools.
    List,
    /// Show the parsed vdev layout of a pool.
    Status {
        /// Pool name.
        pool: String,
    },
    /// Print the `zpool create` command for every pool in a manifest.
    Render {
        /// Path to manifest TOML file.
        #[arg(default_value = "zpoolctl.toml")]
        manifest: PathBuf,
    },
    /// Compare a manifest with the live pools.
    Plan {
        /// Path to manifest TOML file.
        #[arg(default_value = "zpoolctl.toml")]
        manifest: PathBuf,
        /// Exit with status 3 when any pool has drifted.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Create missing pools and update drifted properties.
    Apply {
        /// Path to manifest TOML file.
        #[arg(default_value = "zpoolctl.toml")]
        manifest: PathBuf,
    },
    /// Destroy a pool.
    Destroy {
        /// Pool name.
        pool: String,
    },
    /// Read one field of a pool (a vdev category or a pool property).
    Get {
        /// Pool name.
        pool: String,
        /// Field name, e.g. `mirror` or `failmode`.
        field: String,
    },
    /// Change one pool property.
    Set {
        /// Pool name.
        pool: String,
        /// Field name, e.g. `autoexpand`.
        field: String,
        /// New value.
        value: String,
    },
    /// Run diagnostic checks on the tools and configuration.
    Doctor,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the given directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("ZPOOLCTL_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("error: {msg}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let json_output = cli.json;

    let needs_zpool = !matches!(
        cli.command,
        Commands::Render { .. }
            | Commands::Doctor
            | Commands::Completions { .. }
            | Commands::ManPages { .. }
    );
    if needs_zpool
        && cli.backend == "system"
        && std::env::var("ZPOOLCTL_SKIP_PREREQS").as_deref() != Ok("1")
    {
        let missing = zpoolctl_runtime::check_prereqs(&config);
        if !missing.is_empty() {
            eprintln!("error: {}", zpoolctl_runtime::format_missing(&missing));
            return ExitCode::from(EXIT_FAILURE);
        }
    }

    let backend = cli.backend.as_str();
    let result = match cli.command {
        Commands::List => commands::open(backend, &config)
            .and_then(|p| commands::list::run(&p, json_output)),
        Commands::Status { pool } => commands::open(backend, &config)
            .and_then(|mut p| commands::status::run(&mut p, &pool, json_output)),
        Commands::Render { manifest } => commands::render::run(&manifest, json_output),
        Commands::Plan { manifest, check } => commands::open(backend, &config)
            .and_then(|mut p| commands::plan::run(&mut p, &manifest, check, json_output)),
        Commands::Apply { manifest } => commands::open(backend, &config)
            .and_then(|mut p| commands::apply::run(&mut p, &manifest, json_output)),
        Commands::Destroy { pool } => commands::open(backend, &config)
            .and_then(|mut p| commands::destroy::run(&mut p, &pool, json_output)),
        Commands::Get { pool, field } => commands::open(backend, &config)
            .and_then(|mut p| commands::get::run(&mut p, &pool, &field, json_output)),
        Commands::Set { pool, field, value } => commands::open(backend, &config)
            .and_then(|mut p| commands::set::run(&mut p, &pool, &field, &value, json_output)),
        Commands::Doctor => commands::doctor::run(backend, &config, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error:")
                || msg.starts_with("failed to parse manifest")
                || msg.starts_with("failed to read manifest")
            {
                EXIT_MANIFEST_ERROR
            } else if msg.contains("can't be changed") {
                EXIT_DRIFT
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<BackendConfig, String> {
    match path {
        Some(p) => BackendConfig::load(p).map_err(|e| e.to_string()),
        None => BackendConfig::load_default().map_err(|e| e.to_string()),
    }
}
