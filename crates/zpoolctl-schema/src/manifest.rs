use crate::topology::RaidParity;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported manifest_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("invalid pool name: {0}")]
    InvalidPoolName(String),
    #[error("pool '{0}' is declared more than once")]
    DuplicatePool(String),
    #[error("pool '{pool}': {category} contains an empty device group")]
    EmptyDeviceGroup { pool: String, category: String },
    #[error("pool '{pool}': invalid value '{value}' for property {property}: {reason}")]
    InvalidProperty {
        pool: String,
        property: String,
        value: String,
        reason: String,
    },
}

/// On-disk declarative description of one or more pools.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManifestV1 {
    pub manifest_version: u32,
    #[serde(default, rename = "pool")]
    pub pools: Vec<PoolSection>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PoolSection {
    pub name: String,
    #[serde(default)]
    pub disk: Option<Vec<String>>,
    #[serde(default)]
    pub mirror: Option<Vec<String>>,
    #[serde(default)]
    pub raidz: Option<Vec<String>>,
    #[serde(default)]
    pub log: Option<Vec<String>>,
    #[serde(default)]
    pub spare: Option<Vec<String>>,
    #[serde(default)]
    pub cache: Option<Vec<String>>,
    #[serde(default)]
    pub raid_parity: Option<RaidParity>,
    #[serde(default)]
    pub properties: PropertiesSection,
}

/// Scalar pool properties. Values may be written as TOML strings or integers
/// (`ashift = 12`), both are kept as strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PropertiesSection {
    #[serde(default, deserialize_with = "scalar")]
    pub ashift: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub autoexpand: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub failmode: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Bool(bool),
    Str(String),
}

fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| match s {
        Scalar::Int(i) => i.to_string(),
        Scalar::Bool(true) => "on".to_owned(),
        Scalar::Bool(false) => "off".to_owned(),
        Scalar::Str(s) => s,
    }))
}

pub fn parse_manifest_str(input: &str) -> Result<ManifestV1, ManifestError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<ManifestV1, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}
