//! `zpool` argument lists.
//!
//! Everything here is pure: each function returns the arguments that follow
//! the `zpool` binary name and runs nothing.

use tracing::warn;
use zpoolctl_runtime::Platform;
use zpoolctl_schema::{Category, PoolDescription, PoolProperty};

fn split_groups(groups: &[String]) -> impl Iterator<Item = String> + '_ {
    groups
        .iter()
        .flat_map(|g| g.split_whitespace())
        .map(str::to_owned)
}

fn present(groups: Option<&[String]>) -> Option<&[String]> {
    groups.filter(|g| !g.is_empty())
}

/// Arguments for the primary data vdevs.
///
/// Only one primary layout is emitted, chosen as disk, then mirror, then
/// raidz. Each mirror or raidz group becomes its own top-level vdev.
fn vdev_args(desc: &PoolDescription) -> Vec<String> {
    let populated = desc.populated_primaries();
    if populated.len() > 1 {
        warn!(
            "pool {} declares several primary layouts ({}); using {}",
            desc.pool,
            populated
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            populated[0]
        );
    }

    if let Some(disks) = present(desc.groups(Category::Disk)) {
        return split_groups(disks).collect();
    }

    let (keyword, groups) = if let Some(mirrors) = present(desc.groups(Category::Mirror)) {
        (Category::Mirror.as_str(), mirrors)
    } else if let Some(raidz) = present(desc.groups(Category::Raidz)) {
        (desc.resolved_parity().as_str(), raidz)
    } else {
        return Vec::new();
    };

    let mut args = Vec::new();
    for group in groups {
        args.push(keyword.to_owned());
        args.extend(group.split_whitespace().map(str::to_owned));
    }
    args
}

/// `spare`, `log` and `cache` sections, each a keyword followed by all of
/// its devices.
fn auxiliary_args(desc: &PoolDescription) -> Vec<String> {
    let mut args = Vec::new();
    for category in Category::AUXILIARY {
        if let Some(groups) = present(desc.groups(category)) {
            args.push(category.as_str().to_owned());
            args.extend(split_groups(groups));
        }
    }
    args
}

fn property_args(desc: &PoolDescription) -> Vec<String> {
    let mut args = Vec::new();
    for property in PoolProperty::ALL {
        if let Some(value) = desc.property(property).filter(|v| !v.is_empty()) {
            args.push("-o".to_owned());
            args.push(format!("{property}={value}"));
        }
    }
    args
}

/// Arguments to `zpool create` for `desc`, without the subcommand itself.
///
/// Never fails and performs no validation: an empty description still
/// yields the pool name.
pub fn build_create_args(desc: &PoolDescription) -> Vec<String> {
    let mut args = property_args(desc);
    args.push(desc.pool.to_string());
    args.extend(vdev_args(desc));
    args.extend(auxiliary_args(desc));
    args
}

pub fn create_command(desc: &PoolDescription) -> Vec<String> {
    let mut args = vec!["create".to_owned()];
    args.extend(build_create_args(desc));
    args
}

pub fn destroy_command(pool: &str) -> Vec<String> {
    vec!["destroy".to_owned(), pool.to_owned()]
}

pub fn set_command(name: &str, value: &str, pool: &str) -> Vec<String> {
    vec!["set".to_owned(), format!("{name}={value}"), pool.to_owned()]
}

pub fn get_command(property: &str, pool: &str) -> Vec<String> {
    vec!["get".to_owned(), property.to_owned(), pool.to_owned()]
}

pub fn list_command() -> Vec<String> {
    vec!["list".to_owned(), "-H".to_owned()]
}

/// On Linux `-P` makes `zpool status` print full device paths, matching
/// the paths pools are created with.
pub fn status_command(pool: &str, platform: Platform) -> Vec<String> {
    let mut args = vec!["status".to_owned()];
    if platform.is_linux() {
        args.push("-P".to_owned());
    }
    args.push(pool.to_owned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use zpoolctl_schema::{RaidParity, Topology};

    fn strs(args: &[String]) -> Vec<&str> {
        args.iter().map(String::as_str).collect()
    }

    /// Read the vdev section of a create argument list back into groups,
    /// the way `zpool create` interprets it.
    fn decode_vdevs(args: &[String]) -> Topology {
        fn close(t: &mut Topology, group: Option<(Category, Vec<&str>)>) {
            if let Some((c, devices)) = group {
                t.groups.entry(c).or_default().push(devices.join(" "));
            }
        }

        let mut topology = Topology::named(args[0].as_str());
        let mut current: Option<(Category, Vec<&str>)> = None;
        for arg in &args[1..] {
            let keyword = match arg.as_str() {
                "mirror" => Some(Category::Mirror),
                a if a.starts_with("raidz") => {
                    topology.raid_parity = a.parse::<RaidParity>().ok();
                    Some(Category::Raidz)
                }
                _ => None,
            };
            match keyword {
                Some(c) => {
                    close(&mut topology, current.take());
                    current = Some((c, Vec::new()));
                }
                None => match current.as_mut() {
                    Some((_, devices)) => devices.push(arg.as_str()),
                    None => current = Some((Category::Disk, vec![arg.as_str()])),
                },
            }
        }
        close(&mut topology, current);
        topology
    }

    #[test]
    fn disks_with_ashift() {
        let desc = PoolDescription::new("poolname")
            .with_groups(Category::Disk, ["/dev/sda", "/dev/sdb"])
            .with_property(PoolProperty::Ashift, "12");
        assert_eq!(
            strs(&build_create_args(&desc)),
            ["-o", "ashift=12", "poolname", "/dev/sda", "/dev/sdb"]
        );
    }

    #[test]
    fn log_follows_all_vdevs() {
        let desc = PoolDescription::new("tank")
            .with_groups(Category::Mirror, ["/dev/sda /dev/sdb"])
            .with_groups(Category::Log, ["/dev/sdc"]);
        assert_eq!(
            strs(&build_create_args(&desc)),
            ["tank", "mirror", "/dev/sda", "/dev/sdb", "log", "/dev/sdc"]
        );
    }

    #[test]
    fn one_keyword_per_mirror_group() {
        let desc = PoolDescription::new("tank")
            .with_groups(Category::Mirror, ["/dev/sda /dev/sdb", "/dev/sdc  /dev/sdd"]);
        assert_eq!(
            strs(&build_create_args(&desc)),
            ["tank", "mirror", "/dev/sda", "/dev/sdb", "mirror", "/dev/sdc", "/dev/sdd"]
        );
    }

    #[test]
    fn raidz_uses_declared_or_single_parity() {
        let desc = PoolDescription::new("tank")
            .with_groups(Category::Raidz, ["/dev/sda /dev/sdb /dev/sdc"]);
        assert_eq!(build_create_args(&desc)[1], "raidz1");

        let desc = desc.with_parity(RaidParity::Raidz3);
        assert_eq!(build_create_args(&desc)[1], "raidz3");
    }

    #[test]
    fn auxiliary_order_and_flattening() {
        let desc = PoolDescription::new("tank")
            .with_groups(Category::Disk, ["/dev/sda"])
            .with_groups(Category::Cache, ["/dev/sdd"])
            .with_groups(Category::Log, ["/dev/sdc"])
            .with_groups(Category::Spare, ["/dev/sde /dev/sdf", "/dev/sdg"]);
        assert_eq!(
            strs(&build_create_args(&desc)),
            [
                "tank", "/dev/sda", "spare", "/dev/sde", "/dev/sdf", "/dev/sdg", "log",
                "/dev/sdc", "cache", "/dev/sdd"
            ]
        );
    }

    #[test]
    fn empty_aux_and_properties_emit_nothing() {
        let desc = PoolDescription::new("tank")
            .with_groups(Category::Disk, ["/dev/sda"])
            .with_groups(Category::Log, Vec::<String>::new())
            .with_property(PoolProperty::Failmode, "");
        assert_eq!(strs(&build_create_args(&desc)), ["tank", "/dev/sda"]);
    }

    #[test]
    fn properties_in_fixed_order() {
        let desc = PoolDescription::new("tank")
            .with_property(PoolProperty::Failmode, "panic")
            .with_property(PoolProperty::Autoexpand, "on")
            .with_property(PoolProperty::Ashift, "9");
        assert_eq!(
            strs(&build_create_args(&desc)),
            ["-o", "ashift=9", "-o", "autoexpand=on", "-o", "failmode=panic", "tank"]
        );
    }

    #[test]
    fn disk_wins_over_other_primaries() {
        let desc = PoolDescription::new("tank")
            .with_groups(Category::Raidz, ["/dev/sdc /dev/sdd /dev/sde"])
            .with_groups(Category::Mirror, ["/dev/sda /dev/sdb"])
            .with_groups(Category::Disk, ["/dev/sdf"]);
        assert_eq!(strs(&build_create_args(&desc)), ["tank", "/dev/sdf"]);

        let desc = PoolDescription {
            disk: None,
            ..desc
        };
        assert_eq!(
            strs(&build_create_args(&desc)),
            ["tank", "mirror", "/dev/sda", "/dev/sdb"]
        );
    }

    #[test]
    fn no_primary_yields_bare_pool() {
        let desc = PoolDescription::new("tank").with_groups(Category::Spare, ["/dev/sda"]);
        assert_eq!(strs(&build_create_args(&desc)), ["tank", "spare", "/dev/sda"]);
    }

    #[test]
    fn single_primary_decodes_back() {
        let cases = [
            PoolDescription::new("tank").with_groups(Category::Disk, ["/dev/sda /dev/sdb"]),
            PoolDescription::new("tank")
                .with_groups(Category::Mirror, ["/dev/sda /dev/sdb", "/dev/sdc /dev/sdd"]),
            PoolDescription::new("tank")
                .with_groups(Category::Raidz, ["/dev/sda /dev/sdb /dev/sdc"])
                .with_parity(RaidParity::Raidz2),
        ];
        for desc in cases {
            let decoded = decode_vdevs(&build_create_args(&desc));
            let category = desc.populated_primaries()[0];
            let expected: Vec<String> = match category {
                // Plain disks come back as a single space-joined group.
                Category::Disk => vec![split_groups(desc.groups(category).unwrap())
                    .collect::<Vec<_>>()
                    .join(" ")],
                _ => desc.groups(category).unwrap().to_vec(),
            };
            assert_eq!(decoded.group(category).unwrap(), expected.as_slice());
            if category == Category::Raidz {
                assert_eq!(decoded.raid_parity, desc.raid_parity);
            }
        }
    }

    #[test]
    fn create_prepends_subcommand() {
        let desc = PoolDescription::new("tank").with_groups(Category::Disk, ["/dev/sda"]);
        assert_eq!(strs(&create_command(&desc)), ["create", "tank", "/dev/sda"]);
    }

    #[test]
    fn auxiliary_commands() {
        assert_eq!(strs(&destroy_command("tank")), ["destroy", "tank"]);
        assert_eq!(
            strs(&set_command("failmode", "continue", "tank")),
            ["set", "failmode=continue", "tank"]
        );
        assert_eq!(strs(&get_command("ashift", "tank")), ["get", "ashift", "tank"]);
        assert_eq!(strs(&list_command()), ["list", "-H"]);
        assert_eq!(
            strs(&status_command("tank", Platform::Linux)),
            ["status", "-P", "tank"]
        );
        assert_eq!(strs(&status_command("tank", Platform::Other)), ["status", "tank"]);
    }

    fn any_primary() -> impl Strategy<Value = Category> {
        prop_oneof![
            Just(Category::Disk),
            Just(Category::Mirror),
            Just(Category::Raidz),
        ]
    }

    fn any_parity() -> impl Strategy<Value = Option<RaidParity>> {
        proptest::option::of(prop_oneof![
            Just(RaidParity::Raidz1),
            Just(RaidParity::Raidz2),
            Just(RaidParity::Raidz3),
        ])
    }

    /// `sizes[i]` devices in group `i`, named so that none repeats.
    fn device_groups(sizes: &[usize]) -> Vec<String> {
        let mut next = 0;
        sizes
            .iter()
            .map(|&n| {
                let group: Vec<String> =
                    (next..next + n).map(|i| format!("/dev/vd{i}")).collect();
                next += n;
                group.join(" ")
            })
            .collect()
    }

    proptest! {
        #[test]
        fn generated_primaries_decode_back(
            category in any_primary(),
            parity in any_parity(),
            sizes in proptest::collection::vec(1usize..6, 1..5),
        ) {
            let groups = device_groups(&sizes);
            let mut desc = PoolDescription::new("tank").with_groups(category, groups.clone());
            if let Some(parity) = parity {
                desc = desc.with_parity(parity);
            }

            let decoded = decode_vdevs(&build_create_args(&desc));
            prop_assert_eq!(decoded.groups.len(), 1);
            let expected = match category {
                Category::Disk => vec![groups.join(" ")],
                _ => groups,
            };
            prop_assert_eq!(decoded.group(category).unwrap(), expected.as_slice());
            let expected_parity = (category == Category::Raidz).then(|| desc.resolved_parity());
            prop_assert_eq!(decoded.raid_parity, expected_parity);
        }
    }
}
