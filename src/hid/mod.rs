//! Raw HID mouse discovery and report reading
//!
//! This module provides the device-facing half of the bridge:
//! - Device access abstraction ([`DeviceSource`] / [`HidrawDevice`])
//! - hidraw implementation for Linux and Android
//! - Discovery and read loop ([`MousePoller`])
//! - Worker tasks that keep the blocking calls off the caller's thread
//! - Mock sink and scripted device source for testing

pub mod constants;
pub mod descriptor;
pub mod hidraw;
pub mod mock_sink;
pub mod mock_source;
pub mod poller;
pub mod worker;

pub use constants::*;
pub use descriptor::{descriptor_signature, is_boot_mouse};
pub use hidraw::system_source;
pub use mock_sink::{MockMouseSink, SinkEvent};
pub use mock_source::{ScriptedDevice, ScriptedRead, ScriptedSource};
pub use poller::{MousePoller, ReadGate};
pub use worker::{BlockingContext, PollerWorker};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HidError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{request} failed: {source}")]
    Ioctl {
        request: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Report read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("No mouse has been discovered")]
    MissingDevice,

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("Platform not supported")]
    PlatformNotSupported,
}

/// Identity information from `HIDIOCGRAWINFO`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInfo {
    pub bustype: u32,
    pub vendor: u16,
    pub product: u16,
}

impl RawInfo {
    /// Short name of the bus the device sits on
    pub fn bus_name(&self) -> &'static str {
        match self.bustype {
            BUS_USB => "USB",
            BUS_HIL => "HIL",
            BUS_BLUETOOTH => "Bluetooth",
            BUS_VIRTUAL => "Virtual",
            _ => "Other",
        }
    }
}

/// An opened raw HID device
pub trait HidrawDevice: Send {
    /// Full report descriptor
    fn report_descriptor(&mut self) -> Result<Vec<u8>, HidError>;

    /// Bus, vendor and product ids
    fn raw_info(&mut self) -> Result<RawInfo, HidError>;

    /// Device name as reported by the driver
    fn raw_name(&mut self) -> Result<String, HidError>;

    /// Blocking read of one input report into `buf`
    fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, HidError>;
}

/// Where raw HID devices come from
pub trait DeviceSource: Send + Sync {
    /// Does the path exist and can it be opened for reading
    fn is_readable(&self, path: &Path) -> bool;

    /// Open the device at `path` read-only with blocking reads
    fn open(&self, path: &Path) -> Result<Box<dyn HidrawDevice>, HidError>;
}

/// Receiver for poller notifications
pub trait MouseSink: Send + Sync {
    /// A boot-protocol mouse was found and reading is allowed
    fn mouse_discovered(&self);

    /// The mouse could not be opened or a read failed
    fn mouse_disconnected(&self);

    /// One raw input report
    fn report_received(&self, report: &[u8]);
}

impl<T: MouseSink + ?Sized> MouseSink for Arc<T> {
    fn mouse_discovered(&self) {
        (**self).mouse_discovered()
    }

    fn mouse_disconnected(&self) {
        (**self).mouse_disconnected()
    }

    fn report_received(&self, report: &[u8]) {
        (**self).report_received(report)
    }
}
