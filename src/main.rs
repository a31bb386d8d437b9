//! Turret mouse monitor
//!
//! Scans hidraw for the turret mouse and prints every published side
//! channel value as one JSON line on stdout. Logs go to stderr.
//!
//! Usage: `turret-input [config.toml]`

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use turret_input::config::Config;
use turret_input::hid::MouseSink;
use turret_input::InputBridge;

const DEFAULT_CONFIG: &str = "configs/default.toml";

/// Logs poller notifications
struct LoggingSink;

impl MouseSink for LoggingSink {
    fn mouse_discovered(&self) {
        info!("Mouse discovered");
    }

    fn mouse_disconnected(&self) {
        info!("Mouse disconnected, rescanning");
    }

    fn report_received(&self, report: &[u8]) {
        log::trace!("Report {:02x?}", report);
    }
}

fn load_config() -> Result<Config> {
    if let Some(path) = std::env::args().nth(1) {
        return Config::load(&path).with_context(|| format!("loading {}", path));
    }

    if Path::new(DEFAULT_CONFIG).exists() {
        return Config::load_default().with_context(|| format!("loading {}", DEFAULT_CONFIG));
    }

    warn!("{} not found, using built-in defaults", DEFAULT_CONFIG);
    Ok(Config::default())
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    info!(
        "Display {}x{}, scanning {}0..{}",
        config.cursor.display_width,
        config.cursor.display_height,
        config.poller.device_prefix,
        config.poller.scan_count
    );

    let mut bridge = InputBridge::new(config, Arc::new(LoggingSink));
    bridge.start()?;

    let published = bridge.published_receiver().clone();
    while bridge.is_running() {
        match published.recv() {
            Ok(mouse) => println!("{}", serde_json::to_string(&mouse)?),
            Err(_) => break,
        }
    }

    Ok(())
}
