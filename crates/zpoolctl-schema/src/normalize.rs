use crate::description::{PoolDescription, PoolProperty};
use crate::manifest::{ManifestError, ManifestV1, PoolSection};
use crate::topology::Category;
use crate::types::PoolName;
use std::collections::BTreeSet;

impl ManifestV1 {
    /// Validate the manifest and turn every `[[pool]]` table into a
    /// [`PoolDescription`], preserving declaration order.
    ///
    /// Device groups are whitespace-normalized. Declaring more than one of
    /// `disk`/`mirror`/`raidz` is accepted; the create command picks the
    /// highest-priority one.
    pub fn normalize(&self) -> Result<Vec<PoolDescription>, ManifestError> {
        if self.manifest_version != 1 {
            return Err(ManifestError::UnsupportedVersion(self.manifest_version));
        }

        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(self.pools.len());
        for section in &self.pools {
            let desc = section.normalize()?;
            if !seen.insert(desc.pool.clone()) {
                return Err(ManifestError::DuplicatePool(desc.pool.into_inner()));
            }
            out.push(desc);
        }
        Ok(out)
    }
}

impl PoolSection {
    pub fn normalize(&self) -> Result<PoolDescription, ManifestError> {
        let pool = PoolName::new(self.name.trim());
        pool.validate().map_err(ManifestError::InvalidPoolName)?;

        let mut desc = PoolDescription::new(pool.clone());
        for category in Category::ALL {
            let declared = match category {
                Category::Disk => &self.disk,
                Category::Mirror => &self.mirror,
                Category::Raidz => &self.raidz,
                Category::Log => &self.log,
                Category::Spare => &self.spare,
                Category::Cache => &self.cache,
            };
            if let Some(groups) = declared {
                let groups = normalize_groups(&pool, category, groups)?;
                desc = desc.with_groups(category, groups);
            }
        }
        desc.raid_parity = self.raid_parity;

        let props = &self.properties;
        for (property, value) in [
            (PoolProperty::Ashift, &props.ashift),
            (PoolProperty::Autoexpand, &props.autoexpand),
            (PoolProperty::Failmode, &props.failmode),
        ] {
            if let Some(value) = value {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                validate_property(&pool, property, value)?;
                desc = desc.with_property(property, value);
            }
        }

        Ok(desc)
    }
}

fn normalize_groups(
    pool: &PoolName,
    category: Category,
    groups: &[String],
) -> Result<Vec<String>, ManifestError> {
    groups
        .iter()
        .map(|g| {
            let joined = g.split_whitespace().collect::<Vec<_>>().join(" ");
            if joined.is_empty() {
                Err(ManifestError::EmptyDeviceGroup {
                    pool: pool.to_string(),
                    category: category.to_string(),
                })
            } else {
                Ok(joined)
            }
        })
        .collect()
}

fn validate_property(
    pool: &PoolName,
    property: PoolProperty,
    value: &str,
) -> Result<(), ManifestError> {
    let reason = match property {
        PoolProperty::Ashift => match value.parse::<u8>() {
            Ok(0 | 9..=16) => None,
            _ => Some("expected 0 (auto-detect) or an integer between 9 and 16"),
        },
        PoolProperty::Autoexpand => {
            (!matches!(value, "on" | "off")).then_some("expected 'on' or 'off'")
        }
        PoolProperty::Failmode => (!matches!(value, "wait" | "continue" | "panic"))
            .then_some("expected 'wait', 'continue' or 'panic'"),
    };

    match reason {
        None => Ok(()),
        Some(reason) => Err(ManifestError::InvalidProperty {
            pool: pool.to_string(),
            property: property.to_string(),
            value: value.to_owned(),
            reason: reason.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::manifest::parse_manifest_str;
    use crate::{Category, ManifestError, RaidParity};

    #[test]
    fn normalizes_groups_and_properties() {
        let input = r#"
manifest_version = 1

[[pool]]
name = " tank "
mirror = ["/dev/sda   /dev/sdb", "  /dev/sdc /dev/sdd"]
log = ["/dev/sde"]

[pool.properties]
ashift = "12"
autoexpand = "off"
"#;
        let pools = parse_manifest_str(input).unwrap().normalize().unwrap();
        assert_eq!(pools.len(), 1);
        let tank = &pools[0];
        assert_eq!(tank.pool, "tank");
        assert_eq!(
            tank.groups(Category::Mirror).unwrap(),
            ["/dev/sda /dev/sdb", "/dev/sdc /dev/sdd"]
        );
        assert_eq!(tank.groups(Category::Log).unwrap(), ["/dev/sde"]);
        assert!(tank.groups(Category::Disk).is_none());
        assert_eq!(tank.ashift.as_deref(), Some("12"));
        assert_eq!(tank.autoexpand.as_deref(), Some("off"));
        assert!(tank.failmode.is_none());
    }

    #[test]
    fn keeps_parity_and_conflicting_primaries() {
        let input = r#"
manifest_version = 1

[[pool]]
name = "tank"
mirror = ["/dev/sda /dev/sdb"]
raidz = ["/dev/sdc /dev/sdd /dev/sde"]
raid_parity = "raidz2"
"#;
        let pools = parse_manifest_str(input).unwrap().normalize().unwrap();
        assert_eq!(pools[0].raid_parity, Some(RaidParity::Raidz2));
        assert_eq!(
            pools[0].populated_primaries(),
            vec![Category::Mirror, Category::Raidz]
        );
    }

    #[test]
    fn rejects_wrong_version() {
        let err = parse_manifest_str("manifest_version = 2\n")
            .unwrap()
            .normalize()
            .unwrap_err();
        assert!(matches!(err, ManifestError::UnsupportedVersion(2)));
    }

    #[test]
    fn rejects_duplicate_pools() {
        let input = r#"
manifest_version = 1
[[pool]]
name = "tank"
[[pool]]
name = "tank"
"#;
        let err = parse_manifest_str(input).unwrap().normalize().unwrap_err();
        assert!(matches!(err, ManifestError::DuplicatePool(ref p) if p == "tank"));
    }

    #[test]
    fn rejects_empty_device_group() {
        let input = r#"
manifest_version = 1
[[pool]]
name = "tank"
spare = ["/dev/sda", "   "]
"#;
        let err = parse_manifest_str(input).unwrap().normalize().unwrap_err();
        assert!(err.to_string().contains("spare"), "{err}");
    }

    #[test]
    fn rejects_invalid_pool_name() {
        let input = r#"
manifest_version = 1
[[pool]]
name = "mirror"
"#;
        let err = parse_manifest_str(input).unwrap().normalize().unwrap_err();
        assert!(matches!(err, ManifestError::InvalidPoolName(_)));
    }

    #[test]
    fn rejects_out_of_range_properties() {
        let cases = [
            ("ashift", "\"8\""),
            ("autoexpand", "\"yes\""),
            ("failmode", "\"abort\""),
        ];
        for (prop, value) in cases {
            let input = format!(
                "manifest_version = 1\n[[pool]]\nname = \"tank\"\n\
                 [pool.properties]\n{prop} = {value}\n"
            );
            let err = parse_manifest_str(&input).unwrap().normalize().unwrap_err();
            assert!(
                matches!(
                    err,
                    ManifestError::InvalidProperty { ref property, .. } if property == prop
                ),
                "{prop}: {err}"
            );
        }
    }

    #[test]
    fn empty_property_values_are_undeclared() {
        let input = r#"
manifest_version = 1
[[pool]]
name = "tank"
disk = ["/dev/sda"]

[pool.properties]
failmode = ""
autoexpand = "  "
ashift = "12"
"#;
        let pools = parse_manifest_str(input).unwrap().normalize().unwrap();
        assert!(pools[0].failmode.is_none());
        assert!(pools[0].autoexpand.is_none());
        assert_eq!(pools[0].ashift.as_deref(), Some("12"));
    }

    #[test]
    fn accepts_pool_names_starting_with_log_or_cache() {
        for name in ["cachepool", "logs", "logvol"] {
            let input = format!("manifest_version = 1\n[[pool]]\nname = \"{name}\"\n");
            let pools = parse_manifest_str(&input).unwrap().normalize().unwrap();
            assert_eq!(pools[0].pool, name);
        }
    }
}
