//! Structured view of a pool's vdev layout.

use crate::types::PoolName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of vdev a device group belongs to.
///
/// `Disk`, `Mirror` and `Raidz` describe the primary data vdevs; the rest are
/// auxiliary and independent of the primary choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Disk,
    Mirror,
    Raidz,
    Log,
    Spare,
    Cache,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Disk,
        Category::Mirror,
        Category::Raidz,
        Category::Log,
        Category::Spare,
        Category::Cache,
    ];

    /// Primary categories in builder priority order.
    pub const PRIMARY: [Category; 3] = [Category::Disk, Category::Mirror, Category::Raidz];

    /// Auxiliary categories in the order `zpool create` receives them.
    pub const AUXILIARY: [Category; 3] = [Category::Spare, Category::Log, Category::Cache];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Disk => "disk",
            Category::Mirror => "mirror",
            Category::Raidz => "raidz",
            Category::Log => "log",
            Category::Spare => "spare",
            Category::Cache => "cache",
        }
    }

    pub fn is_primary(self) -> bool {
        matches!(self, Category::Disk | Category::Mirror | Category::Raidz)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown vdev category '{s}'"))
    }
}

/// Redundancy level of a raidz vdev.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaidParity {
    #[default]
    Raidz1,
    Raidz2,
    Raidz3,
}

impl RaidParity {
    pub fn as_str(self) -> &'static str {
        match self {
            RaidParity::Raidz1 => "raidz1",
            RaidParity::Raidz2 => "raidz2",
            RaidParity::Raidz3 => "raidz3",
        }
    }
}

impl fmt::Display for RaidParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RaidParity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raidz" | "raidz1" => Ok(RaidParity::Raidz1),
            "raidz2" => Ok(RaidParity::Raidz2),
            "raidz3" => Ok(RaidParity::Raidz3),
            other => Err(format!("unknown raid parity '{other}'")),
        }
    }
}

/// Pool layout as reported by `zpool status`.
///
/// `pool == None` is the absent sentinel: the pool does not exist. A present
/// pool may still have no groups. Categories that were not reported are left
/// out of `groups` entirely rather than mapped to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub pool: Option<PoolName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raid_parity: Option<RaidParity>,
    #[serde(default)]
    pub groups: BTreeMap<Category, Vec<String>>,
}

impl Topology {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn named(pool: impl Into<PoolName>) -> Self {
        Self {
            pool: Some(pool.into()),
            ..Self::default()
        }
    }

    pub fn is_absent(&self) -> bool {
        self.pool.is_none()
    }

    pub fn group(&self, category: Category) -> Option<&[String]> {
        self.groups.get(&category).map(Vec::as_slice)
    }

    /// Insert `group` in front of the groups already recorded for `category`.
    pub fn prepend_group(&mut self, category: Category, group: String) {
        self.groups.entry(category).or_default().insert(0, group);
    }

    /// The primary category the pool was built with, if any was reported.
    pub fn primary_category(&self) -> Option<Category> {
        Category::PRIMARY
            .into_iter()
            .find(|c| self.groups.contains_key(c))
    }
}
