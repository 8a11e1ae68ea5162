//! Partition-to-parent device normalization.
//!
//! `zpool status -P` on Linux reports the partition ZFS labelled
//! (`/dev/sda1`, `/dev/nvme0n1p1`, `/dev/disk/by-id/...-part1`) while pools
//! are declared with whole disks. Comparing the two verbatim would report
//! drift forever, so reported partitions are mapped back to their parent
//! block device.

use crate::platform::Platform;
use crate::RuntimeError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// The leading `(:?` is an optional literal colon, matching the device
// shapes older status output produced.
static PARTITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/dev/(:?[a-z]+([0-9]+n[0-9]+p)?1|disk/by-id/.+-part1)$")
        .expect("valid partition pattern")
});

/// Resolves a partition path to the path of the block device holding it.
pub trait ParentDeviceLookup {
    fn parent_device(&self, path: &str) -> Result<String, RuntimeError>;
}

impl<F> ParentDeviceLookup for F
where
    F: Fn(&str) -> Result<String, RuntimeError>,
{
    fn parent_device(&self, path: &str) -> Result<String, RuntimeError> {
        self(path)
    }
}

/// Whether `path` looks like the first partition of a disk.
pub fn is_partition_path(path: &str) -> bool {
    PARTITION_RE.is_match(path)
}

/// Map a reported device path to the whole-disk path it was created with.
///
/// Paths are only rewritten on Linux and only when they look like a first
/// partition. A failed or empty lookup is an error: returning the partition
/// unchanged would make every later comparison report drift.
pub fn normalize_device<L>(
    path: &str,
    platform: Platform,
    lookup: &L,
) -> Result<String, RuntimeError>
where
    L: ParentDeviceLookup + ?Sized,
{
    if !platform.is_linux() || !is_partition_path(path) {
        return Ok(path.to_owned());
    }

    let parent = lookup.parent_device(path)?;
    let parent = parent.trim();
    if parent.is_empty() {
        return Err(RuntimeError::DeviceLookup {
            device: path.to_owned(),
            reason: "lookup returned no parent device".to_owned(),
        });
    }
    debug!("normalized partition {path} to {parent}");
    Ok(parent.to_owned())
}
