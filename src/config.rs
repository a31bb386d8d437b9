//! Configuration loader and validator
//!
//! Loads bridge settings from TOML files in the configs/ directory. Every
//! field has a default, so an empty file (or a single section) is valid.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::hid::constants::{
    BOOT_MOUSE_SIGNATURE, HIDRAW_PATH_PREFIX, RAZER_VENDOR_ID, REDISCOVERY_INTERVAL_MS,
    REPORT_SIZE, SCAN_COUNT,
};
use crate::tracker::constants::MAX_DEVICES;

/// Upper bound for `tracker.max_devices`
pub const MAX_DEVICE_SLOTS: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerSettings,

    #[serde(default)]
    pub poller: PollerSettings,

    #[serde(default)]
    pub cursor: CursorSettings,
}

/// Controller state tracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Number of controller slots
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            max_devices: default_max_devices(),
        }
    }
}

/// Raw HID mouse discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerSettings {
    /// Candidate path prefix; the scan index is appended
    #[serde(default = "default_device_prefix")]
    pub device_prefix: String,

    /// Number of candidate paths per discovery pass
    #[serde(default = "default_scan_count")]
    pub scan_count: u32,

    /// Vendor id whose mouse gets read
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    /// Expected weighted value of the first four descriptor bytes
    #[serde(default = "default_descriptor_signature")]
    pub descriptor_signature: u32,

    /// Bytes per input report
    #[serde(default = "default_report_size")]
    pub report_size: usize,

    /// Delay between discovery passes (milliseconds)
    #[serde(default = "default_rediscovery_interval_ms")]
    pub rediscovery_interval_ms: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            device_prefix: default_device_prefix(),
            scan_count: default_scan_count(),
            vendor_id: default_vendor_id(),
            descriptor_signature: default_descriptor_signature(),
            report_size: default_report_size(),
            rediscovery_interval_ms: default_rediscovery_interval_ms(),
        }
    }
}

/// Cursor accumulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorSettings {
    #[serde(default = "default_display_width")]
    pub display_width: i32,

    #[serde(default = "default_display_height")]
    pub display_height: i32,

    /// Multiplier applied to X deltas before they move the cursor
    #[serde(default = "default_sensitivity")]
    pub sensitivity_x: f32,

    /// Multiplier applied to Y deltas before they move the cursor
    #[serde(default = "default_sensitivity")]
    pub sensitivity_y: f32,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            display_width: default_display_width(),
            display_height: default_display_height(),
            sensitivity_x: default_sensitivity(),
            sensitivity_y: default_sensitivity(),
        }
    }
}

fn default_max_devices() -> usize { MAX_DEVICES }
fn default_device_prefix() -> String { HIDRAW_PATH_PREFIX.to_string() }
fn default_scan_count() -> u32 { SCAN_COUNT }
fn default_vendor_id() -> u16 { RAZER_VENDOR_ID }
fn default_descriptor_signature() -> u32 { BOOT_MOUSE_SIGNATURE }
fn default_report_size() -> usize { REPORT_SIZE }
fn default_rediscovery_interval_ms() -> u64 { REDISCOVERY_INTERVAL_MS }
fn default_display_width() -> i32 { 1920 }
fn default_display_height() -> i32 { 1080 }
fn default_sensitivity() -> f32 { 1.0 }

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("Loading configuration from: {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        Self::from_toml(&content)
    }

    /// Load default configuration from configs/default.toml
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load("configs/default.toml")
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;

        debug!("  - Device slots: {}", config.tracker.max_devices);
        debug!(
            "  - Scan: {}0..{} vendor {:04x}",
            config.poller.device_prefix, config.poller.scan_count, config.poller.vendor_id
        );
        debug!(
            "  - Display: {}x{}",
            config.cursor.display_width, config.cursor.display_height
        );

        config.validate()?;
        info!("✓ Config validation passed");

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.max_devices == 0 || self.tracker.max_devices > MAX_DEVICE_SLOTS {
            return Err(ConfigError::Invalid(format!(
                "max_devices must be between 1 and {}",
                MAX_DEVICE_SLOTS
            )));
        }

        if self.poller.device_prefix.is_empty() {
            return Err(ConfigError::Invalid("device_prefix must not be empty".into()));
        }

        if self.poller.scan_count == 0 {
            return Err(ConfigError::Invalid("scan_count must be positive".into()));
        }

        if self.poller.report_size == 0 {
            return Err(ConfigError::Invalid("report_size must be positive".into()));
        }

        if self.cursor.display_width < 0 || self.cursor.display_height < 0 {
            return Err(ConfigError::Invalid(
                "display resolution must not be negative".into(),
            ));
        }

        if self.cursor.sensitivity_x <= 0.0 || self.cursor.sensitivity_y <= 0.0 {
            return Err(ConfigError::Invalid(
                "sensitivity values must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tracker.max_devices, 4);
        assert_eq!(config.poller.device_prefix, "/dev/input/hidraw");
        assert_eq!(config.poller.scan_count, 20);
        assert_eq!(config.poller.vendor_id, 0x1532);
        assert_eq!(config.poller.descriptor_signature, 5192);
        assert_eq!(config.poller.report_size, 8);
        assert_eq!(config.poller.rediscovery_interval_ms, 3000);
        assert_eq!(config.cursor.display_width, 1920);
        assert_eq!(config.cursor.display_height, 1080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [poller]
            scan_count = 4
            vendor_id = 0x046d

            [cursor]
            sensitivity_x = 2.5
            "#,
        )
        .unwrap();

        assert_eq!(config.poller.scan_count, 4);
        assert_eq!(config.poller.vendor_id, 0x046d);
        assert_eq!(config.poller.report_size, 8);
        assert_eq!(config.cursor.sensitivity_x, 2.5);
        assert_eq!(config.cursor.sensitivity_y, 1.0);
        assert_eq!(config.tracker.max_devices, 4);
    }

    #[test]
    fn test_invalid_values() {
        for toml in [
            "[tracker]\nmax_devices = 0",
            "[tracker]\nmax_devices = 17",
            "[poller]\nscan_count = 0",
            "[poller]\nreport_size = 0",
            "[poller]\ndevice_prefix = \"\"",
            "[cursor]\nsensitivity_y = 0.0",
            "[cursor]\ndisplay_width = -1",
        ] {
            assert!(
                matches!(Config::from_toml(toml), Err(ConfigError::Invalid(_))),
                "accepted: {}",
                toml
            );
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::from_toml("[poller]\nscan_count = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
