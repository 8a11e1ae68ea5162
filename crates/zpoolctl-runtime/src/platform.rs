use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system family the zpool tooling runs on.
///
/// Only the Linux distinction matters: OpenZFS on Linux reports partitions
/// and needs `-P` to print full device paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Other,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn is_linux(self) -> bool {
        self == Platform::Linux
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => f.write_str("linux"),
            Platform::Other => f.write_str("other"),
        }
    }
}
