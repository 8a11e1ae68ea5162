//! Command layer for zpoolctl.
//!
//! This crate is the boundary to the outside world: the `ZpoolBackend` trait with
//! a process-spawning `SystemBackend` and an in-memory `MockBackend`, extraction
//! of topology tokens from `zpool status` text, `zpool get`/`zpool list` output
//! parsing, partition-to-parent device normalization via `lsblk`, platform
//! detection, backend configuration, and prerequisite checks.

pub mod backend;
pub mod config;
pub mod device;
pub mod mock;
pub mod platform;
pub mod prereq;
pub mod property;
pub mod status;
pub mod system;

pub use backend::{select_backend, CommandOutput, ZpoolBackend};
pub use config::BackendConfig;
pub use device::{is_partition_path, normalize_device, ParentDeviceLookup};
pub use mock::MockBackend;
pub use platform::Platform;
pub use prereq::{check_prereqs, format_missing, MissingPrereq};
pub use property::{parse_pool_list, parse_property_value, PROPERTY_UNAVAILABLE};
pub use status::extract_topology_tokens;
pub use system::SystemBackend;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend '{0}' is not available")]
    BackendUnavailable(String),
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("cannot resolve parent device of {device}: {reason}")]
    DeviceLookup { device: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
}
