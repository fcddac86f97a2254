use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::device::DeviceId;

/// HID usage page of the special keys top-level collection.
pub const DEFAULT_USAGE_PAGE: u16 = 0x01;
/// HID usage of the special keys top-level collection (keyboard).
pub const DEFAULT_USAGE: u16 = 0x06;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device_id: DeviceId,
    #[serde(default = "default_usage_page")]
    pub usage_page: u16,
    #[serde(default = "default_usage")]
    pub usage: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_usage_page() -> u16 {
    DEFAULT_USAGE_PAGE
}
fn default_usage() -> u16 {
    DEFAULT_USAGE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_id: DeviceId::MAJ1428_SPECIAL_KEYS,
            usage_page: default_usage_page(),
            usage: default_usage(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load config from file, or create default if not exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if !path.as_ref().exists() {
            let default_config = Self::default();
            default_config.save_to_file(&path)?;
            return Ok(default_config);
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;

        // Zero is not a valid usage page or usage for a top-level collection
        if config.usage_page == 0 {
            config.usage_page = DEFAULT_USAGE_PAGE;
        }
        if config.usage == 0 {
            config.usage = DEFAULT_USAGE;
        }
        if config.log_level.trim().is_empty() {
            config.log_level = default_log_level();
        }

        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let commented = format!(
            "# Special keys interface to translate (VID:PID, hex)\n\
             device_id = \"{}\"\n\n\
             # HID top-level collection registered for raw reports\n\
             usage_page = {}              # e.g. 0x01 = Generic Desktop\n\
             usage = {}                   # e.g. 0x06 = Keyboard\n\n\
             # Log filter (error, warn, info, debug, trace); RUST_LOG takes precedence\n\
             log_level = \"{}\"\n",
            self.device_id, self.usage_page, self.usage, self.log_level
        );

        fs::write(path, commented)?;
        Ok(())
    }
}
