//! Mouse discovery and the report read loop
//!
//! Discovery walks `prefix0 .. prefix{scan_count-1}`, opens every readable
//! node and matches its report descriptor against the boot-mouse signature.
//! The first descriptor match ends the scan. Only a match from the expected
//! vendor records a path for the read loop; a foreign match still ends the
//! scan and still opens the read gate.
//!
//! Both calls block, so both take a [`BlockingContext`] which only exists
//! on a worker thread.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, trace, warn};

use super::descriptor::{descriptor_signature, is_boot_mouse};
use super::worker::BlockingContext;
use super::{system_source, DeviceSource, HidError, MouseSink};
use crate::config::PollerSettings;

/// Shared "reading allowed" flag
///
/// Discovery opens the gate; a read failure or an explicit stop closes it.
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct ReadGate(Arc<AtomicBool>);

impl ReadGate {
    /// A closed gate
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Finds the turret mouse and pumps its reports into a [`MouseSink`]
pub struct MousePoller {
    settings: PollerSettings,
    source: Box<dyn DeviceSource>,
    mouse_path: Mutex<Option<PathBuf>>,
    gate: ReadGate,
}

impl MousePoller {
    pub fn new(settings: PollerSettings, source: Box<dyn DeviceSource>) -> Self {
        Self {
            settings,
            source,
            mouse_path: Mutex::new(None),
            gate: ReadGate::new(),
        }
    }

    /// Poller over the platform's hidraw nodes
    pub fn with_system_source(settings: PollerSettings) -> Self {
        Self::new(settings, system_source())
    }

    pub fn settings(&self) -> &PollerSettings {
        &self.settings
    }

    /// Path of the `index`th scan candidate
    pub fn candidate_path(&self, index: u32) -> PathBuf {
        PathBuf::from(format!("{}{}", self.settings.device_prefix, index))
    }

    /// Path recorded by the last vendor match, if any
    pub fn mouse_path(&self) -> Option<PathBuf> {
        self.lock_path().clone()
    }

    /// Handle to the read gate, usable from any thread
    pub fn read_gate(&self) -> ReadGate {
        self.gate.clone()
    }

    pub fn is_reading_allowed(&self) -> bool {
        self.gate.is_open()
    }

    /// Scan the candidate paths once.
    ///
    /// Returns `true` and notifies `sink` when a descriptor matched. Open and
    /// ioctl failures are logged and count as a miss for that path.
    pub fn discover_mouse(&self, _ctx: &BlockingContext, sink: &dyn MouseSink) -> bool {
        debug!(
            "Scanning {}0..{}",
            self.settings.device_prefix, self.settings.scan_count
        );

        for index in 0..self.settings.scan_count {
            let path = self.candidate_path(index);
            if !self.source.is_readable(&path) {
                continue;
            }

            match self.check_node(&path) {
                Ok(true) => {
                    self.gate.open();
                    sink.mouse_discovered();
                    return true;
                }
                Ok(false) => {}
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        debug!("No mouse found");
        false
    }

    /// Check one node. `Ok(true)` on a descriptor match, even when the
    /// identity query then fails.
    fn check_node(&self, path: &Path) -> Result<bool, HidError> {
        let mut device = self.source.open(path)?;
        let descriptor = device.report_descriptor()?;
        trace!(
            "{}: descriptor {} bytes, signature {:?}",
            path.display(),
            descriptor.len(),
            descriptor_signature(&descriptor)
        );

        if !is_boot_mouse(&descriptor, self.settings.descriptor_signature) {
            return Ok(false);
        }

        let info = match device.raw_info() {
            Ok(info) => info,
            Err(e) => {
                warn!("{}: {}, path not recorded", path.display(), e);
                return Ok(true);
            }
        };
        let name = device.raw_name().unwrap_or_default();
        info!(
            "Boot mouse at {}: \"{}\" {:04x}:{:04x} on {}",
            path.display(),
            name,
            info.vendor,
            info.product,
            info.bus_name()
        );

        if info.vendor == self.settings.vendor_id {
            *self.lock_path() = Some(path.to_path_buf());
        } else {
            debug!(
                "Vendor {:04x} is not {:04x}, path not recorded",
                info.vendor, self.settings.vendor_id
            );
        }
        Ok(true)
    }

    /// Read reports from the recorded path until the gate closes, the node
    /// goes away or a read fails.
    ///
    /// Returns immediately without notifications when nothing was recorded.
    /// A failed open or read closes the gate and reports a disconnect.
    pub fn read_report_loop(&self, _ctx: &BlockingContext, sink: &dyn MouseSink) {
        let Some(path) = self.mouse_path() else {
            debug!("No mouse path recorded, not reading");
            return;
        };

        let mut device = match self.source.open(&path) {
            Ok(device) => device,
            Err(e) => {
                warn!("{}", e);
                self.disconnect(sink);
                return;
            }
        };

        info!("Reading reports from {}", path.display());
        let mut buf = vec![0u8; self.settings.report_size];

        while self.source.is_readable(&path) && self.gate.is_open() {
            match device.read_report(&mut buf) {
                Ok(0) => {
                    warn!("{}: end of stream", path.display());
                    self.disconnect(sink);
                    return;
                }
                Ok(n) => {
                    // Reports always go out at full size
                    buf[n..].fill(0);
                    sink.report_received(&buf);
                }
                Err(e) => {
                    warn!("{}: {}", path.display(), e);
                    self.disconnect(sink);
                    return;
                }
            }
        }

        debug!("Read loop for {} finished", path.display());
    }

    /// Ask a running read loop to exit after its current read
    pub fn stop_read_report_loop(&self) -> bool {
        self.gate.close();
        true
    }

    fn disconnect(&self, sink: &dyn MouseSink) {
        self.gate.close();
        sink.mouse_disconnected();
    }

    fn lock_path(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        self.mouse_path.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
