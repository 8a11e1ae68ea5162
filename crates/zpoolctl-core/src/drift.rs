//! Desired-versus-current comparison for one pool.

use crate::field::{Field, FieldValue};
use serde::Serialize;
use std::collections::BTreeMap;
use zpoolctl_runtime::PROPERTY_UNAVAILABLE;
use zpoolctl_schema::{Category, PoolDescription, PoolName, PoolProperty, Topology};

/// One field whose declared value does not match the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEntry {
    pub field: Field,
    pub desired: FieldValue,
    pub current: FieldValue,
    /// Whether `zpool set` can reconcile this field.
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub pool: PoolName,
    pub exists: bool,
    pub entries: Vec<DriftEntry>,
}

impl DriftReport {
    /// A pool that does not exist always counts as drifted.
    pub fn has_drift(&self) -> bool {
        !self.exists || !self.entries.is_empty()
    }

    pub fn immutable(&self) -> impl Iterator<Item = &DriftEntry> {
        self.entries.iter().filter(|e| !e.mutable)
    }

    pub fn mutable(&self) -> impl Iterator<Item = &DriftEntry> {
        self.entries.iter().filter(|e| e.mutable)
    }
}

fn sorted_tokens<'a>(groups: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut tokens: Vec<&str> = groups
        .into_iter()
        .flat_map(|g| g.split_whitespace())
        .collect();
    tokens.sort_unstable();
    tokens
}

/// Whether two group lists describe the same devices for `category`.
///
/// Mirror and raidz vdevs are compared group by group in order, ignoring
/// device order within a group. Other categories are one flat device set.
pub fn groups_in_sync(category: Category, desired: &[String], current: &[String]) -> bool {
    match category {
        Category::Mirror | Category::Raidz => {
            desired.len() == current.len()
                && desired
                    .iter()
                    .zip(current)
                    .all(|(d, c)| sorted_tokens([d]) == sorted_tokens([c]))
        }
        Category::Disk | Category::Log | Category::Spare | Category::Cache => {
            sorted_tokens(desired) == sorted_tokens(current)
        }
    }
}

/// Compare `desc` with the pool's reported topology and property values.
///
/// Only declared fields are checked; an empty group list counts as not
/// declared. Properties missing from `properties` compare as absent, and an
/// unavailable `ashift` is never reported.
pub fn diff_pool(
    desc: &PoolDescription,
    current: &Topology,
    properties: &BTreeMap<PoolProperty, String>,
) -> DriftReport {
    let mut entries = Vec::new();

    if !current.is_absent() {
        for category in Category::ALL {
            let Some(desired) = desc.groups(category).filter(|g| !g.is_empty()) else {
                continue;
            };
            let in_sync = current
                .group(category)
                .is_some_and(|cur| groups_in_sync(category, desired, cur));
            if !in_sync {
                entries.push(DriftEntry {
                    field: category.into(),
                    desired: FieldValue::Groups(desired.to_vec()),
                    current: FieldValue::from_groups(current.group(category)),
                    mutable: false,
                });
            }
        }

        for property in PoolProperty::ALL {
            let Some(desired) = desc.property(property).filter(|v| !v.is_empty()) else {
                continue;
            };
            let actual = properties.get(&property).map(String::as_str);
            if property.platform_specific() && actual == Some(PROPERTY_UNAVAILABLE) {
                continue;
            }
            if actual != Some(desired) {
                entries.push(DriftEntry {
                    field: property.into(),
                    desired: FieldValue::Scalar(desired.to_owned()),
                    current: FieldValue::from_scalar(actual),
                    mutable: true,
                });
            }
        }
    }

    DriftReport {
        pool: desc.pool.clone(),
        exists: !current.is_absent(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| (*x).to_owned()).collect()
    }

    fn mirror_pool() -> Topology {
        let mut t = Topology::named("tank");
        t.prepend_group(Category::Mirror, "/dev/sdb /dev/sda".to_owned());
        t.prepend_group(Category::Log, "/dev/sdc".to_owned());
        t
    }

    #[test]
    fn flat_categories_ignore_grouping() {
        assert!(groups_in_sync(
            Category::Disk,
            &s(&["/dev/sda /dev/sdb"]),
            &s(&["/dev/sdb", "/dev/sda"])
        ));
        assert!(!groups_in_sync(
            Category::Cache,
            &s(&["/dev/sda"]),
            &s(&["/dev/sda /dev/sdb"])
        ));
    }

    #[test]
    fn redundant_categories_compare_per_group() {
        let desired = s(&["/dev/sda /dev/sdb", "/dev/sdc /dev/sdd"]);
        assert!(groups_in_sync(
            Category::Mirror,
            &desired,
            &s(&["/dev/sdb /dev/sda", "/dev/sdd /dev/sdc"])
        ));
        assert!(!groups_in_sync(
            Category::Mirror,
            &desired,
            &s(&["/dev/sda /dev/sdc", "/dev/sdb /dev/sdd"])
        ));
        assert!(!groups_in_sync(
            Category::Raidz,
            &desired,
            &s(&["/dev/sda /dev/sdb /dev/sdc /dev/sdd"])
        ));
    }

    #[test]
    fn matching_pool_has_no_drift() {
        let desc = PoolDescription::new("tank")
            .with_groups(Category::Mirror, ["/dev/sda /dev/sdb"])
            .with_groups(Category::Log, ["/dev/sdc"])
            .with_property(PoolProperty::Failmode, "wait");
        let props = BTreeMap::from([(PoolProperty::Failmode, "wait".to_owned())]);
        let report = diff_pool(&desc, &mirror_pool(), &props);
        assert!(report.exists);
        assert!(!report.has_drift(), "{report:?}");
    }

    #[test]
    fn declared_category_missing_from_pool_drifts() {
        let desc = PoolDescription::new("tank").with_groups(Category::Disk, ["/dev/sda /dev/sdb"]);
        let report = diff_pool(&desc, &mirror_pool(), &BTreeMap::new());
        assert_eq!(report.entries.len(), 1);
        let entry = &report.entries[0];
        assert_eq!(entry.field, Field::Disk);
        assert_eq!(entry.current, FieldValue::Absent);
        assert!(!entry.mutable);
    }

    #[test]
    fn property_drift_is_mutable() {
        let desc = PoolDescription::new("tank")
            .with_property(PoolProperty::Autoexpand, "on")
            .with_property(PoolProperty::Failmode, "wait");
        let props = BTreeMap::from([
            (PoolProperty::Autoexpand, "off".to_owned()),
            (PoolProperty::Failmode, "wait".to_owned()),
        ]);
        let report = diff_pool(&desc, &mirror_pool(), &props);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].field, Field::Autoexpand);
        assert_eq!(report.entries[0].current, FieldValue::Scalar("off".to_owned()));
        assert_eq!(report.mutable().count(), 1);
        assert_eq!(report.immutable().count(), 0);
    }

    #[test]
    fn unavailable_ashift_is_not_drift() {
        let desc = PoolDescription::new("tank").with_property(PoolProperty::Ashift, "12");
        let props = BTreeMap::from([(PoolProperty::Ashift, "-".to_owned())]);
        assert!(!diff_pool(&desc, &mirror_pool(), &props).has_drift());

        let props = BTreeMap::from([(PoolProperty::Ashift, "9".to_owned())]);
        assert!(diff_pool(&desc, &mirror_pool(), &props).has_drift());
    }

    #[test]
    fn absent_pool_is_drift_without_entries() {
        let desc = PoolDescription::new("tank").with_groups(Category::Disk, ["/dev/sda"]);
        let report = diff_pool(&desc, &Topology::absent(), &BTreeMap::new());
        assert!(!report.exists);
        assert!(report.entries.is_empty());
        assert!(report.has_drift());
    }

    #[test]
    fn undeclared_fields_are_ignored() {
        let desc = PoolDescription::new("tank");
        assert!(!diff_pool(&desc, &mirror_pool(), &BTreeMap::new()).has_drift());
    }
}
