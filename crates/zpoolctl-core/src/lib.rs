//! Core translation layer for zpoolctl.
//!
//! This crate turns `zpool status` token lists into [`Topology`] values
//! (`topology`), turns [`PoolDescription`]s back into `zpool create` argument
//! lists (`command`), compares the two (`drift`), and wraps it all in
//! [`PoolProvider`]: a per-pass topology cache plus a fixed table of field
//! getters and setters that enforces immutable vdev membership.
//!
//! [`Topology`]: zpoolctl_schema::Topology
//! [`PoolDescription`]: zpoolctl_schema::PoolDescription

pub mod cache;
pub mod command;
pub mod drift;
pub mod field;
pub mod provider;
pub mod topology;

pub use cache::TopologyCache;
pub use command::{
    build_create_args, create_command, destroy_command, get_command, list_command, set_command,
    status_command,
};
pub use drift::{diff_pool, groups_in_sync, DriftEntry, DriftReport};
pub use field::{Field, FieldValue};
pub use provider::{ApplyOutcome, PoolProvider};
pub use topology::parse_topology;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] zpoolctl_schema::ManifestError),
    #[error("runtime error: {0}")]
    Runtime(#[from] zpoolctl_runtime::RuntimeError),
    #[error("zpool {field} can't be changed. should be {should}, currently is {current}")]
    ImmutableField {
        field: Field,
        should: String,
        current: String,
    },
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: Field, value: String },
    #[error("pool '{0}' does not exist")]
    PoolNotFound(String),
}
