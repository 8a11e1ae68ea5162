//! Topology model, declarative pool descriptions, and manifest parsing for zpoolctl.
//!
//! This crate defines the schema layer: the `Topology` reported by `zpool status`,
//! the `PoolDescription` a caller wants a pool to look like, the vdev `Category`
//! and `RaidParity` vocabulary shared by both, and the TOML manifest (`ManifestV1`)
//! that normalizes into descriptions.

pub mod description;
pub mod manifest;
pub mod normalize;
pub mod topology;
pub mod types;

pub use description::{PoolDescription, PoolProperty};
pub use manifest::{
    parse_manifest_file, parse_manifest_str, ManifestError, ManifestV1, PoolSection,
    PropertiesSection,
};
pub use topology::{Category, RaidParity, Topology};
pub use types::PoolName;
