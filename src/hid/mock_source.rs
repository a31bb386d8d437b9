//! Scripted device source for testing.
//!
//! [`ScriptedSource`] maps paths to [`ScriptedDevice`] templates. Every
//! `open` hands out a fresh copy of the template, so a discovery pass and the
//! read loop that follows see the same descriptor and reports. Clones share
//! the same table, which lets a test unplug a device while a loop runs.
//! Opens can also be held, leaving the caller blocked inside `open` until
//! the test releases them.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use log::info;

use super::{DeviceSource, HidError, HidrawDevice, RawInfo};

/// One scripted result of `read_report`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedRead {
    Report(Vec<u8>),
    Eof,
    Error,
}

/// Scripted hidraw device
#[derive(Debug, Clone, Default)]
pub struct ScriptedDevice {
    descriptor: Option<Vec<u8>>,
    info: Option<RawInfo>,
    name: String,
    reads: VecDeque<ScriptedRead>,
}

impl ScriptedDevice {
    /// Device with the given descriptor and vendor id on USB
    pub fn new(descriptor: &[u8], vendor: u16) -> Self {
        Self {
            descriptor: Some(descriptor.to_vec()),
            info: Some(RawInfo {
                bustype: super::BUS_USB,
                vendor,
                product: 0,
            }),
            name: format!("Scripted {:04x}", vendor),
            reads: VecDeque::new(),
        }
    }

    /// Device whose descriptor ioctl fails
    pub fn broken_descriptor() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Device that matches on descriptor but fails the identity ioctl
    pub fn without_raw_info(mut self) -> Self {
        self.info = None;
        self
    }

    /// Queue an input report
    pub fn with_report(mut self, report: &[u8]) -> Self {
        self.reads.push_back(ScriptedRead::Report(report.to_vec()));
        self
    }

    /// Queue any scripted read result
    pub fn with_read(mut self, read: ScriptedRead) -> Self {
        self.reads.push_back(read);
        self
    }
}

impl HidrawDevice for ScriptedDevice {
    fn report_descriptor(&mut self) -> Result<Vec<u8>, HidError> {
        self.descriptor.clone().ok_or_else(|| HidError::Ioctl {
            request: "HIDIOCGRDESC",
            source: io::Error::from(io::ErrorKind::InvalidInput),
        })
    }

    fn raw_info(&mut self) -> Result<RawInfo, HidError> {
        self.info.ok_or_else(|| HidError::Ioctl {
            request: "HIDIOCGRAWINFO",
            source: io::Error::from(io::ErrorKind::InvalidInput),
        })
    }

    fn raw_name(&mut self) -> Result<String, HidError> {
        Ok(self.name.clone())
    }

    /// Plays back the queue; an exhausted queue reads as an I/O error
    fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, HidError> {
        match self.reads.pop_front() {
            Some(ScriptedRead::Report(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(ScriptedRead::Eof) => Ok(0),
            Some(ScriptedRead::Error) | None => Err(HidError::Read(io::Error::from(
                io::ErrorKind::BrokenPipe,
            ))),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Device(ScriptedDevice),
    Unopenable,
}

/// Blocks `open` callers while held
#[derive(Debug, Default)]
struct OpenLatch {
    held: Mutex<bool>,
    released: Condvar,
    waiting: AtomicUsize,
}

impl OpenLatch {
    fn wait(&self) {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if *held {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            while *held {
                held = self.released.wait(held).unwrap_or_else(PoisonError::into_inner);
            }
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn set(&self, hold: bool) {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner) = hold;
        if !hold {
            self.released.notify_all();
        }
    }
}

/// Device source backed by an in-memory table of paths
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    nodes: Arc<Mutex<HashMap<PathBuf, Node>>>,
    latch: Arc<OpenLatch>,
    opens: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a device at `path`
    pub fn insert(&self, path: impl Into<PathBuf>, device: ScriptedDevice) {
        self.lock().insert(path.into(), Node::Device(device));
    }

    /// A path that passes the readability check but fails to open
    pub fn insert_unopenable(&self, path: impl Into<PathBuf>) {
        self.lock().insert(path.into(), Node::Unopenable);
    }

    /// Unplug the device at `path`
    pub fn remove(&self, path: &Path) {
        info!("[MOCK HID] Removed {}", path.display());
        self.lock().remove(path);
    }

    /// Make every following `open` block until [`release_opens`](Self::release_opens)
    pub fn hold_opens(&self) {
        info!("[MOCK HID] Holding opens");
        self.latch.set(true);
    }

    pub fn release_opens(&self) {
        info!("[MOCK HID] Releasing opens");
        self.latch.set(false);
    }

    /// Callers currently blocked inside `open`
    pub fn blocked_opens(&self) -> usize {
        self.latch.waiting.load(Ordering::SeqCst)
    }

    /// Total `open` calls, including failed and blocked ones
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceSource for ScriptedSource {
    fn is_readable(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn HidrawDevice>, HidError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.latch.wait();

        match self.lock().get(path) {
            Some(Node::Device(device)) => {
                info!("[MOCK HID] Open {}", path.display());
                Ok(Box::new(device.clone()))
            }
            Some(Node::Unopenable) => Err(HidError::Open {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }),
            None => Err(HidError::Open {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }
}
