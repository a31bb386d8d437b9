//! turret-input: controller state tracking and raw HID turret mouse polling
//!
//! This library mirrors a host's game-controller input (axes, held buttons,
//! per-frame press/release edges) and reads a Razer boot-protocol mouse
//! straight from hidraw, publishing its state through a six-value side
//! channel.

pub mod bridge;
pub mod config;
pub mod hid;
pub mod tracker;
pub mod turret;

// Re-export commonly used items
pub use bridge::{BridgeError, InputBridge};
pub use config::{Config, ConfigError};
pub use hid::{HidError, MousePoller, MouseSink, PollerWorker};
pub use tracker::{InputEvent, TrackerState};
pub use turret::{CursorTracker, MouseReport, TurretError, TurretMouseInfo};
