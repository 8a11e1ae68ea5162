//! `zpool status` token list to [`Topology`].
//!
//! The status table only expresses nesting through indentation, which the
//! token list no longer carries. Group keywords (`mirror-0`, `logs`, ...)
//! precede their members, so the list is scanned back to front: devices
//! collect in a pending group until the keyword that owns them is reached.

use crate::CoreError;
use tracing::trace;
use zpoolctl_runtime::{normalize_device, ParentDeviceLookup, Platform};
use zpoolctl_schema::{Category, RaidParity, Topology};

/// Section headings `zpool status` prints above auxiliary devices.
const SECTION_KEYWORDS: [(&str, Category); 3] = [
    ("spares", Category::Spare),
    ("logs", Category::Log),
    ("cache", Category::Cache),
];

/// What a token closes when the reverse scan reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary {
    category: Category,
    parity: Option<RaidParity>,
}

/// Map a status token to the group it opens, or `None` for a device.
///
/// Top-level vdev labels carry an index suffix (`mirror-0`, `raidz2-1`), so
/// they match by prefix. Only single and double parity labels are known;
/// anything else falls through as a device.
fn boundary_category(token: &str) -> Option<Boundary> {
    if let Some(&(_, category)) = SECTION_KEYWORDS.iter().find(|(k, _)| *k == token) {
        return Some(Boundary {
            category,
            parity: None,
        });
    }
    if token.starts_with("mirror") {
        Some(Boundary {
            category: Category::Mirror,
            parity: None,
        })
    } else if token.starts_with("raidz2") {
        Some(Boundary {
            category: Category::Raidz,
            parity: Some(RaidParity::Raidz2),
        })
    } else if token.starts_with("raidz1") {
        Some(Boundary {
            category: Category::Raidz,
            parity: None,
        })
    } else {
        None
    }
}

/// Devices seen since the last boundary, in reverse report order.
#[derive(Debug, Default)]
struct PendingGroup {
    devices: Vec<String>,
}

impl PendingGroup {
    fn push(&mut self, device: String) {
        self.devices.push(device);
    }

    /// Join the pending devices in report order and start a new group.
    fn flush(&mut self) -> String {
        let mut devices = std::mem::take(&mut self.devices);
        devices.reverse();
        devices.join(" ")
    }
}

/// Build a [`Topology`] from the tokens of one pool's status table.
///
/// `tokens[0]` is the pool name; an empty slice means the pool does not
/// exist and yields [`Topology::absent`]. Device tokens are passed through
/// [`normalize_device`], whose lookup failures are returned.
///
/// Unrecognized tokens are taken as device paths, and a keyword directly
/// followed by another keyword records an empty group.
pub fn parse_topology<L>(
    tokens: &[String],
    platform: Platform,
    lookup: &L,
) -> Result<Topology, CoreError>
where
    L: ParentDeviceLookup + ?Sized,
{
    let Some((pool, entries)) = tokens.split_first() else {
        return Ok(Topology::absent());
    };

    let mut topology = Topology::named(pool.as_str());
    let mut pending = PendingGroup::default();

    for (index, entry) in entries.iter().enumerate().rev() {
        if let Some(b) = boundary_category(entry) {
            if b.parity.is_some() {
                topology.raid_parity = b.parity;
            }
            let group = pending.flush();
            trace!("{entry}: closing {} group '{group}'", b.category);
            topology.prepend_group(b.category, group);
            continue;
        }

        pending.push(normalize_device(entry, platform, lookup)?);

        // A bare device at the very top of the table has no keyword above
        // it: it and the devices after it are plain disk vdevs.
        if index == 0 {
            topology.prepend_group(Category::Disk, pending.flush());
        }
    }

    Ok(topology)
}
