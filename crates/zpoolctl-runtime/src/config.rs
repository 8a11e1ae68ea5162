use crate::platform::Platform;
use crate::RuntimeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the backend finds its tools, and which reporting conventions to assume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_zpool_bin")]
    pub zpool_bin: String,
    #[serde(default = "default_lsblk_bin")]
    pub lsblk_bin: String,
    /// Overrides platform detection when set.
    #[serde(default)]
    pub platform: Option<Platform>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            zpool_bin: default_zpool_bin(),
            lsblk_bin: default_lsblk_bin(),
            platform: None,
        }
    }
}

fn default_zpool_bin() -> String {
    "zpool".to_owned()
}

fn default_lsblk_bin() -> String {
    "lsblk".to_owned()
}

impl BackendConfig {
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::detect)
    }

    /// Load `~/.config/zpoolctl/config.json`, falling back to defaults when
    /// the file does not exist.
    pub fn load_default() -> Result<Self, RuntimeError> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RuntimeError::Config(format!("invalid config {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), RuntimeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn default_config_path() -> Result<PathBuf, RuntimeError> {
    let home = std::env::var("HOME").map_err(|_| RuntimeError::Config("HOME not set".to_owned()))?;
    Ok(PathBuf::from(home).join(".config/zpoolctl/config.json"))
}
