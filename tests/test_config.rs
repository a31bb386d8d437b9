//! Integration tests for loading configuration files

use std::io::Write;

use turret_input::config::{Config, ConfigError};

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[tracker]
max_devices = 2

[cursor]
display_width = 1280
display_height = 720
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.tracker.max_devices, 2);
    assert_eq!(config.cursor.display_width, 1280);
    assert_eq!(config.cursor.display_height, 720);
    assert_eq!(config.poller.scan_count, 20);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_load_invalid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[cursor]\nsensitivity_x = -1.0").unwrap();

    let result = Config::load(file.path());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_shipped_default_config() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/configs/default.toml")).unwrap();
    assert_eq!(config, Config::default());
}
