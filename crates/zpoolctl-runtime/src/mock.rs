//! In-memory stand-in for `zpool(8)`.
//!
//! Understands the subset of subcommands zpoolctl issues (`list -H`, `status`,
//! `get`, `set`, `create`, `destroy`) and renders `zpool status` tables from
//! the vdev arguments a pool was created with, so parse-after-create can be
//! exercised without real devices.

use crate::backend::{CommandOutput, ZpoolBackend};
use crate::device::ParentDeviceLookup;
use crate::platform::Platform;
use crate::RuntimeError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEFAULT_PROPERTIES: &[(&str, &str)] =
    &[("ashift", "0"), ("autoexpand", "off"), ("failmode", "wait")];

#[derive(Debug, Default)]
struct MockState {
    pools: BTreeMap<String, MockPool>,
    parents: BTreeMap<String, String>,
    unsupported: BTreeSet<String>,
    commands: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
struct MockPool {
    status: String,
    properties: BTreeMap<String, String>,
}

pub struct MockBackend {
    platform: Platform,
    state: Mutex<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::with_platform(Platform::Other)
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(platform: Platform) -> Self {
        Self {
            platform,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Register an existing pool whose `zpool status` output is `raw`.
    #[must_use]
    pub fn with_pool_status(mut self, pool: &str, raw: &str) -> Self {
        self.state_mut().pools.insert(
            pool.to_owned(),
            MockPool {
                status: raw.to_owned(),
                properties: BTreeMap::new(),
            },
        );
        self
    }

    #[must_use]
    pub fn with_property(mut self, pool: &str, property: &str, value: &str) -> Self {
        self.state_mut()
            .pools
            .entry(pool.to_owned())
            .or_default()
            .properties
            .insert(property.to_owned(), value.to_owned());
        self
    }

    /// Make `lsblk` report `parent` for `partition`. Pools created afterwards
    /// show the partition instead of the whole disk, as ZFS on Linux does.
    #[must_use]
    pub fn with_parent(mut self, partition: &str, parent: &str) -> Self {
        self.state_mut()
            .parents
            .insert(partition.to_owned(), parent.to_owned());
        self
    }

    /// Make `get`/`set` of `property` fail as on a platform lacking it.
    #[must_use]
    pub fn with_unsupported_property(mut self, property: &str) -> Self {
        self.state_mut().unsupported.insert(property.to_owned());
        self
    }

    /// Every argument list passed to `run`, oldest first.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.state().commands.clone()
    }

    pub fn has_pool(&self, pool: &str) -> bool {
        self.state().pools.contains_key(pool)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut MockState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ParentDeviceLookup for MockBackend {
    fn parent_device(&self, path: &str) -> Result<String, RuntimeError> {
        self.state()
            .parents
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::DeviceLookup {
                device: path.to_owned(),
                reason: "not a partition known to the mock".to_owned(),
            })
    }
}

impl ZpoolBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput, RuntimeError> {
        let mut state = self.state();
        state.commands.push(args.to_vec());

        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let out = match argv.as_slice() {
            ["list", "-H"] => list(&state),
            ["status", .., pool] => status(&state, pool),
            ["get", property, pool] => get(&state, property, pool),
            ["set", assignment, pool] => set(&mut state, assignment, pool),
            ["create", rest @ ..] => create(&mut state, rest),
            ["destroy", pool] => match state.pools.remove(*pool) {
                Some(_) => CommandOutput::ok(""),
                None => no_such_pool(pool),
            },
            _ => CommandOutput::failed(2, format!("unrecognized command '{}'", args.join(" "))),
        };
        Ok(out)
    }
}

fn no_such_pool(pool: &str) -> CommandOutput {
    CommandOutput::failed(1, format!("cannot open '{pool}': no such pool\n"))
}

fn list(state: &MockState) -> CommandOutput {
    let mut out = String::new();
    for name in state.pools.keys() {
        let _ = writeln!(out, "{name}\t99.5G\t1.2G\t98.3G\t-\t1%\tONLINE\t-");
    }
    CommandOutput::ok(out)
}

fn status(state: &MockState, pool: &str) -> CommandOutput {
    match state.pools.get(pool) {
        Some(p) => CommandOutput::ok(p.status.clone()),
        None => no_such_pool(pool),
    }
}

fn get(state: &MockState, property: &str, pool: &str) -> CommandOutput {
    if state.unsupported.contains(property) {
        return CommandOutput::failed(
            2,
            format!("bad property list: invalid property '{property}'\n"),
        );
    }
    let Some(p) = state.pools.get(pool) else {
        return no_such_pool(pool);
    };
    let (value, source) = match p.properties.get(property) {
        Some(v) => (v.as_str(), "local"),
        None => DEFAULT_PROPERTIES
            .iter()
            .find(|(k, _)| *k == property)
            .map_or(("-", "-"), |(_, v)| (*v, "default")),
    };
    CommandOutput::ok(format!(
        "NAME\tPROPERTY\tVALUE\tSOURCE\n{pool}\t{property}\t{value}\t{source}\n"
    ))
}

fn set(state: &mut MockState, assignment: &str, pool: &str) -> CommandOutput {
    let Some((property, value)) = assignment.split_once('=') else {
        return CommandOutput::failed(2, format!("missing '=' in '{assignment}'\n"));
    };
    if state.unsupported.contains(property) {
        return CommandOutput::failed(
            2,
            format!("cannot set property for '{pool}': invalid property '{property}'\n"),
        );
    }
    match state.pools.get_mut(pool) {
        Some(p) => {
            p.properties.insert(property.to_owned(), value.to_owned());
            CommandOutput::ok("")
        }
        None => no_such_pool(pool),
    }
}

fn create(state: &mut MockState, args: &[&str]) -> CommandOutput {
    let mut properties = BTreeMap::new();
    let mut rest = args;
    while let ["-o", assignment, tail @ ..] = rest {
        if let Some((k, v)) = assignment.split_once('=') {
            properties.insert(k.to_owned(), v.to_owned());
        }
        rest = tail;
    }
    let Some((pool, vdevs)) = rest.split_first() else {
        return CommandOutput::failed(2, "missing pool name\n");
    };
    if state.pools.contains_key(*pool) {
        return CommandOutput::failed(1, format!("cannot create '{pool}': pool already exists\n"));
    }

    let status = render_status(pool, vdevs, &state.parents);
    state
        .pools
        .insert((*pool).to_owned(), MockPool { status, properties });
    CommandOutput::ok("")
}

/// A top-level vdev or an auxiliary device as `zpool status` lists it.
struct Vdev {
    label: Option<String>,
    devices: Vec<String>,
}

fn render_status(pool: &str, vdevs: &[&str], parents: &BTreeMap<String, String>) -> String {
    let mut sections: BTreeMap<&str, Vec<Vdev>> = BTreeMap::new();
    let mut section = "data";
    let mut index = 0usize;

    for &token in vdevs {
        match token {
            "spare" | "log" | "cache" => section = token,
            "mirror" | "raidz" | "raidz1" | "raidz2" | "raidz3" => {
                let kind = if token == "raidz" { "raidz1" } else { token };
                sections.entry(section).or_default().push(Vdev {
                    label: Some(format!("{kind}-{index}")),
                    devices: Vec::new(),
                });
                index += 1;
            }
            device => {
                let shown = parents
                    .iter()
                    .find(|(_, parent)| parent.as_str() == device)
                    .map_or(device, |(partition, _)| partition.as_str())
                    .to_owned();
                let group = sections.entry(section).or_default();
                match group.last_mut() {
                    Some(v) if v.label.is_some() => v.devices.push(shown),
                    _ => {
                        group.push(Vdev {
                            label: None,
                            devices: vec![shown],
                        });
                        if section == "data" || section == "log" {
                            index += 1;
                        }
                    }
                }
            }
        }
    }

    let mut out = format!(
        "  pool: {pool}\n state: ONLINE\nconfig:\n\n\
         \tNAME          STATE     READ WRITE CKSUM\n\
         \t{pool}  ONLINE       0     0     0\n"
    );
    let headings = [
        ("data", None),
        ("log", Some("logs")),
        ("cache", Some("cache")),
        ("spare", Some("spares")),
    ];
    for (key, heading) in headings {
        let Some(vdevs) = sections.get(key) else {
            continue;
        };
        if let Some(h) = heading {
            let _ = writeln!(out, "\t{h}");
        }
        let indent = "  ";
        let state = if key == "spare" { "AVAIL" } else { "ONLINE       0     0     0" };
        for vdev in vdevs {
            match &vdev.label {
                Some(label) => {
                    let _ = writeln!(out, "\t{indent}{label}  ONLINE       0     0     0");
                    for d in &vdev.devices {
                        let _ = writeln!(out, "\t{indent}  {d}  {state}");
                    }
                }
                None => {
                    for d in &vdev.devices {
                        let _ = writeln!(out, "\t{indent}{d}  {state}");
                    }
                }
            }
        }
    }
    out.push_str("\nerrors: No known data errors\n");
    out
}
