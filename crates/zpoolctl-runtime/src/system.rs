use crate::backend::{CommandOutput, ZpoolBackend};
use crate::config::BackendConfig;
use crate::device::ParentDeviceLookup;
use crate::platform::Platform;
use crate::RuntimeError;
use std::process::Command;
use tracing::{debug, trace};

/// Backend that spawns the real `zpool` and `lsblk` binaries.
pub struct SystemBackend {
    config: BackendConfig,
    platform: Platform,
}

impl SystemBackend {
    pub fn new(config: BackendConfig) -> Self {
        let platform = config.platform();
        Self { config, platform }
    }
}

impl ParentDeviceLookup for SystemBackend {
    fn parent_device(&self, path: &str) -> Result<String, RuntimeError> {
        debug!("{} -p -no pkname {path}", self.config.lsblk_bin);
        let output = Command::new(&self.config.lsblk_bin)
            .args(["-p", "-no", "pkname", path])
            .output()
            .map_err(|e| RuntimeError::DeviceLookup {
                device: path.to_owned(),
                reason: format!("failed to run {}: {e}", self.config.lsblk_bin),
            })?;

        if !output.status.success() {
            return Err(RuntimeError::DeviceLookup {
                device: path.to_owned(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

impl ZpoolBackend for SystemBackend {
    fn name(&self) -> &'static str {
        "system"
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput, RuntimeError> {
        debug!("{} {}", self.config.zpool_bin, args.join(" "));
        let output = Command::new(&self.config.zpool_bin).args(args).output()?;
        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(
            "zpool exited with {:?}: {} bytes stdout, {} bytes stderr",
            result.code,
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(zpool: &str, lsblk: &str) -> BackendConfig {
        BackendConfig {
            zpool_bin: zpool.to_owned(),
            lsblk_bin: lsblk.to_owned(),
            platform: Some(Platform::Linux),
        }
    }

    #[test]
    fn missing_binary_is_io_error() {
        let backend = SystemBackend::new(config_with("/nonexistent/zpool", "lsblk"));
        let err = backend.run(&["list".to_owned()]).unwrap_err();
        assert!(matches!(err, RuntimeError::Io(_)));
    }

    #[test]
    fn missing_lsblk_is_lookup_error() {
        let backend = SystemBackend::new(config_with("zpool", "/nonexistent/lsblk"));
        let err = backend.parent_device("/dev/sda1").unwrap_err();
        assert!(matches!(err, RuntimeError::DeviceLookup { .. }));
    }

    #[test]
    fn non_zero_exit_is_reported_not_raised() {
        // `false` ignores its arguments and exits 1.
        let backend = SystemBackend::new(config_with("false", "lsblk"));
        let out = backend.run(&["status".to_owned(), "tank".to_owned()]).unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(1));
        assert!(backend.zpool(&["status".to_owned()]).is_err());
    }

    #[test]
    fn platform_comes_from_config() {
        let backend = SystemBackend::new(config_with("zpool", "lsblk"));
        assert_eq!(backend.platform(), Platform::Linux);
    }
}
