use crate::topology::{Category, RaidParity};
use crate::types::PoolName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pool-level property that can be passed at creation and changed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolProperty {
    Ashift,
    Autoexpand,
    Failmode,
}

impl PoolProperty {
    /// Order in which `-o name=value` flags are emitted on create.
    pub const ALL: [PoolProperty; 3] = [
        PoolProperty::Ashift,
        PoolProperty::Autoexpand,
        PoolProperty::Failmode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PoolProperty::Ashift => "ashift",
            PoolProperty::Autoexpand => "autoexpand",
            PoolProperty::Failmode => "failmode",
        }
    }

    /// Whether the property only exists on some platforms (ashift is an
    /// OpenZFS-on-Linux pool property).
    pub fn platform_specific(self) -> bool {
        matches!(self, PoolProperty::Ashift)
    }
}

impl fmt::Display for PoolProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoolProperty::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown pool property '{s}'"))
    }
}

/// Desired state of one pool.
///
/// Each group list holds space-joined device strings, one per vdev. At most
/// one of `disk`, `mirror` and `raidz` is expected to be set; nothing here
/// enforces that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescription {
    pub pool: PoolName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raidz: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spare: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raid_parity: Option<RaidParity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ashift: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoexpand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failmode: Option<String>,
}

impl PoolDescription {
    pub fn new(pool: impl Into<PoolName>) -> Self {
        Self {
            pool: pool.into(),
            ..Self::default()
        }
    }

    pub fn groups(&self, category: Category) -> Option<&[String]> {
        let slot = match category {
            Category::Disk => &self.disk,
            Category::Mirror => &self.mirror,
            Category::Raidz => &self.raidz,
            Category::Log => &self.log,
            Category::Spare => &self.spare,
            Category::Cache => &self.cache,
        };
        slot.as_deref()
    }

    #[must_use]
    pub fn with_groups<I, S>(mut self, category: Category, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups = Some(groups.into_iter().map(Into::into).collect());
        match category {
            Category::Disk => self.disk = groups,
            Category::Mirror => self.mirror = groups,
            Category::Raidz => self.raidz = groups,
            Category::Log => self.log = groups,
            Category::Spare => self.spare = groups,
            Category::Cache => self.cache = groups,
        }
        self
    }

    pub fn property(&self, property: PoolProperty) -> Option<&str> {
        match property {
            PoolProperty::Ashift => self.ashift.as_deref(),
            PoolProperty::Autoexpand => self.autoexpand.as_deref(),
            PoolProperty::Failmode => self.failmode.as_deref(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: PoolProperty, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match property {
            PoolProperty::Ashift => self.ashift = value,
            PoolProperty::Autoexpand => self.autoexpand = value,
            PoolProperty::Failmode => self.failmode = value,
        }
        self
    }

    #[must_use]
    pub fn with_parity(mut self, parity: RaidParity) -> Self {
        self.raid_parity = Some(parity);
        self
    }

    /// Declared parity, falling back to single parity.
    pub fn resolved_parity(&self) -> RaidParity {
        self.raid_parity.unwrap_or_default()
    }

    /// Primary categories that carry at least one group.
    pub fn populated_primaries(&self) -> Vec<Category> {
        Category::PRIMARY
            .into_iter()
            .filter(|c| self.groups(*c).is_some_and(|g| !g.is_empty()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_each_category() {
        for c in Category::ALL {
            let d = PoolDescription::new("tank").with_groups(c, ["/dev/sda"]);
            assert_eq!(d.groups(c).unwrap(), ["/dev/sda"]);
            for other in Category::ALL.into_iter().filter(|o| *o != c) {
                assert!(d.groups(other).is_none());
            }
        }
    }

    #[test]
    fn property_accessors() {
        let d = PoolDescription::new("tank")
            .with_property(PoolProperty::Ashift, "12")
            .with_property(PoolProperty::Failmode, "wait");
        assert_eq!(d.property(PoolProperty::Ashift), Some("12"));
        assert_eq!(d.property(PoolProperty::Autoexpand), None);
        assert_eq!(d.property(PoolProperty::Failmode), Some("wait"));
    }

    #[test]
    fn parity_falls_back_to_raidz1() {
        let d = PoolDescription::new("tank");
        assert_eq!(d.resolved_parity(), RaidParity::Raidz1);
        let d = d.with_parity(RaidParity::Raidz3);
        assert_eq!(d.resolved_parity(), RaidParity::Raidz3);
    }

    #[test]
    fn populated_primaries_ignores_empty_lists() {
        let d = PoolDescription::new("tank")
            .with_groups(Category::Disk, Vec::<String>::new())
            .with_groups(Category::Raidz, ["/dev/sda /dev/sdb /dev/sdc"]);
        assert_eq!(d.populated_primaries(), vec![Category::Raidz]);
    }

    #[test]
    fn property_names_parse() {
        assert_eq!("ashift".parse::<PoolProperty>().unwrap(), PoolProperty::Ashift);
        assert!("compression".parse::<PoolProperty>().is_err());
        assert!(PoolProperty::Ashift.platform_specific());
        assert!(!PoolProperty::Failmode.platform_specific());
    }
}
