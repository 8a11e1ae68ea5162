use crate::config::BackendConfig;
use std::fmt;
use std::process::Command;

/// A missing prerequisite with actionable install instructions.
#[derive(Debug)]
pub struct MissingPrereq {
    pub name: String,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check the tools the system backend shells out to.
/// An empty list means everything is in place.
pub fn check_prereqs(config: &BackendConfig) -> Vec<MissingPrereq> {
    let mut missing = Vec::new();

    if !command_exists(&config.zpool_bin) {
        missing.push(MissingPrereq {
            name: config.zpool_bin.clone(),
            purpose: "querying and changing ZFS pools",
            install_hint: "apt install zfsutils-linux | dnf install zfs | \
                           zypper install zfs | pkg install openzfs",
        });
    }

    if config.platform().is_linux() && !command_exists(&config.lsblk_bin) {
        missing.push(MissingPrereq {
            name: config.lsblk_bin.clone(),
            purpose: "resolving partitions to their parent disk",
            install_hint: "part of util-linux (usually pre-installed)",
        });
    }

    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\nzpoolctl drives these tools to inspect and build pools.");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn missing_prereq_display() {
        let m = MissingPrereq {
            name: "zpool".to_owned(),
            purpose: "pools",
            install_hint: "apt install zfsutils-linux",
        };
        let s = format!("{m}");
        assert!(s.contains("zpool"));
        assert!(s.contains("apt install zfsutils-linux"));
    }

    #[test]
    fn absent_binaries_are_reported() {
        let config = BackendConfig {
            zpool_bin: "zpoolctl-test-no-such-zpool".to_owned(),
            lsblk_bin: "zpoolctl-test-no-such-lsblk".to_owned(),
            platform: Some(Platform::Linux),
        };
        let missing = check_prereqs(&config);
        assert_eq!(missing.len(), 2);
        let output = format_missing(&missing);
        assert!(output.contains("missing prerequisites:"));
        assert!(output.contains("zpoolctl-test-no-such-lsblk"));
    }

    #[test]
    fn lsblk_only_required_on_linux() {
        let config = BackendConfig {
            zpool_bin: "zpoolctl-test-no-such-zpool".to_owned(),
            lsblk_bin: "zpoolctl-test-no-such-lsblk".to_owned(),
            platform: Some(Platform::Other),
        };
        let missing = check_prereqs(&config);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "zpoolctl-test-no-such-zpool");
    }
}
