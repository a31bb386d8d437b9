//! Input bridge
//!
//! Owns the controller state tracker and runs the turret mouse pipeline:
//!
//! ```text
//! hid-poller thread                      hid-publisher thread
//!   discover_mouse ──┐                      decode report
//!   read_report_loop ┴─ PollerEvent ──────▶ cursor.apply / poll
//!   sleep, rediscover                       side channel + subscribers
//! ```
//!
//! The poller thread blocks in device reads, so [`InputBridge::stop`] only
//! takes effect once the current read returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::config::Config;
use crate::hid::{system_source, BlockingContext, DeviceSource, MousePoller, MouseSink};
use crate::tracker::TrackerState;
use crate::turret::{CursorTracker, MouseReport, TurretMouseInfo};

/// Poll interval of the publisher thread
const PUBLISH_POLL_MS: u64 = 16;

/// Slice length used while waiting for the next discovery pass
const SLEEP_SLICE_MS: u64 = 50;

/// Capacity of the published info channel
const PUBLISHED_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Bridge is already running")]
    AlreadyRunning,

    #[error("Threads from the previous run have not exited yet")]
    StillStopping,

    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Notification from the poller thread
#[derive(Debug, Clone, PartialEq, Eq)]
enum PollerEvent {
    Discovered,
    Disconnected,
    Report(Vec<u8>),
}

/// Sink that hands poller notifications to the publisher thread
struct ChannelSink {
    sender: Sender<PollerEvent>,
}

impl ChannelSink {
    fn send(&self, event: PollerEvent) {
        if self.sender.send(event).is_err() {
            trace!("Publisher gone, dropping poller event");
        }
    }
}

impl MouseSink for ChannelSink {
    fn mouse_discovered(&self) {
        self.send(PollerEvent::Discovered);
    }

    fn mouse_disconnected(&self) {
        self.send(PollerEvent::Disconnected);
    }

    fn report_received(&self, report: &[u8]) {
        self.send(PollerEvent::Report(report.to_vec()));
    }
}

/// Controller state plus the turret mouse side channel
pub struct InputBridge {
    config: Config,
    tracker: TrackerState,
    poller: Arc<MousePoller>,
    cursor: Arc<Mutex<CursorTracker>>,
    info: Arc<Mutex<TurretMouseInfo>>,
    sink: Arc<dyn MouseSink>,
    running: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    published_sender: Sender<TurretMouseInfo>,
    published_receiver: Receiver<TurretMouseInfo>,
}

impl InputBridge {
    /// Bridge over the platform's hidraw nodes
    pub fn new(config: Config, sink: Arc<dyn MouseSink>) -> Self {
        Self::with_source(config, system_source(), sink)
    }

    /// Bridge over an explicit device source
    pub fn with_source(
        config: Config,
        source: Box<dyn DeviceSource>,
        sink: Arc<dyn MouseSink>,
    ) -> Self {
        let (published_sender, published_receiver) = bounded(PUBLISHED_CAPACITY);

        Self {
            tracker: TrackerState::new(config.tracker.max_devices),
            poller: Arc::new(MousePoller::new(config.poller.clone(), source)),
            cursor: Arc::new(Mutex::new(CursorTracker::from_settings(&config.cursor))),
            info: Arc::new(Mutex::new(TurretMouseInfo::default())),
            sink,
            running: Arc::new(AtomicBool::new(false)),
            threads: Vec::new(),
            published_sender,
            published_receiver,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &TrackerState {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut TrackerState {
        &mut self.tracker
    }

    pub fn poller(&self) -> &Arc<MousePoller> {
        &self.poller
    }

    /// Every side channel value published from now on. Values are dropped
    /// when the receiver falls [`PUBLISHED_CAPACITY`] behind.
    pub fn published_receiver(&self) -> &Receiver<TurretMouseInfo> {
        &self.published_receiver
    }

    /// Copy of the side channel
    pub fn turret_info(&self) -> TurretMouseInfo {
        *lock(&self.info)
    }

    /// Host write into the side channel. Indices outside `0..6` are ignored.
    pub fn set_side_channel_value(&self, index: i32, value: i32) {
        if let Err(e) = lock(&self.info).set(index, value) {
            warn!("{}", e);
        }
    }

    /// Host read from the side channel. Indices outside `0..6` read as 0.
    pub fn side_channel_value(&self, index: i32) -> i32 {
        lock(&self.info).get(index).unwrap_or_else(|e| {
            warn!("{}", e);
            0
        })
    }

    pub fn set_display_resolution(&self, width: i32, height: i32) {
        lock(&self.cursor).set_display_resolution(width, height);
    }

    pub fn set_cursor_position(&self, x: i32, y: i32) {
        lock(&self.cursor).set_cursor_position(x, y);
    }

    pub fn set_sensitivity(&self, sensitivity_x: f64, sensitivity_y: f64) {
        lock(&self.cursor).set_sensitivity(sensitivity_x, sensitivity_y);
    }

    /// Start discovery and publishing threads.
    ///
    /// After a [`stop`](Self::stop) this fails with
    /// [`BridgeError::StillStopping`] until the previous threads are gone.
    /// A poller blocked in a device read leaves once the read returns.
    pub fn start(&mut self) -> Result<(), BridgeError> {
        if self.is_running() {
            return Err(BridgeError::AlreadyRunning);
        }
        if self.threads_alive() {
            return Err(BridgeError::StillStopping);
        }
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                warn!("Previous bridge thread panicked");
            }
        }
        self.running.store(true, Ordering::SeqCst);

        info!("Starting input bridge...");
        let (event_sender, event_receiver) = unbounded();

        let publisher = match self.start_publisher_thread(event_receiver) {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        self.threads.push(publisher);

        match self.start_poller_thread(event_sender) {
            Ok(handle) => self.threads.push(handle),
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }

        info!("✓ Bridge started, scanning for the turret mouse");
        Ok(())
    }

    /// Stop both threads. A read already in progress finishes first.
    pub fn stop(&mut self) {
        info!("Stopping input bridge...");
        self.running.store(false, Ordering::SeqCst);
        self.poller.stop_read_report_loop();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Is any thread from this or a previous run still executing
    pub fn threads_alive(&self) -> bool {
        self.threads.iter().any(|handle| !handle.is_finished())
    }

    fn start_poller_thread(&self, sender: Sender<PollerEvent>) -> Result<JoinHandle<()>, BridgeError> {
        let poller = Arc::clone(&self.poller);
        let running = Arc::clone(&self.running);
        let interval = Duration::from_millis(self.config.poller.rediscovery_interval_ms);
        let sink = ChannelSink { sender };

        BlockingContext::spawn_thread("hid-poller", move |ctx| {
            info!("HID poller thread started");

            while running.load(Ordering::SeqCst) {
                if poller.discover_mouse(ctx, &sink) {
                    // stop() stores the flag before closing the gate, so a
                    // stop during discovery is seen here
                    if !running.load(Ordering::SeqCst) {
                        poller.stop_read_report_loop();
                        break;
                    }
                    poller.read_report_loop(ctx, &sink);
                    debug!("Read loop ended, back to discovery");
                }
                sleep_while_running(&running, interval);
            }

            info!("HID poller thread stopped");
        })
        .map_err(|source| BridgeError::Spawn { name: "hid-poller", source })
    }

    fn start_publisher_thread(
        &self,
        receiver: Receiver<PollerEvent>,
    ) -> Result<JoinHandle<()>, BridgeError> {
        let publisher = Publisher {
            cursor: Arc::clone(&self.cursor),
            info: Arc::clone(&self.info),
            sink: Arc::clone(&self.sink),
            published: self.published_sender.clone(),
        };
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("hid-publisher".to_string())
            .spawn(move || {
                info!("Publisher thread started");

                while running.load(Ordering::SeqCst) {
                    match receiver.recv_timeout(Duration::from_millis(PUBLISH_POLL_MS)) {
                        Ok(event) => publisher.handle(event),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => {
                            debug!("Poller channel closed");
                            break;
                        }
                    }
                }

                info!("Publisher thread stopped");
            })
            .map_err(|source| BridgeError::Spawn { name: "hid-publisher", source })
    }
}

impl Drop for InputBridge {
    fn drop(&mut self) {
        if self.running.load(Ordering::SeqCst) {
            info!("Shutting down input bridge (Drop trait)...");
            self.stop();
        }
    }
}

/// State owned by the publisher thread
struct Publisher {
    cursor: Arc<Mutex<CursorTracker>>,
    info: Arc<Mutex<TurretMouseInfo>>,
    sink: Arc<dyn MouseSink>,
    published: Sender<TurretMouseInfo>,
}

impl Publisher {
    fn handle(&self, event: PollerEvent) {
        match event {
            PollerEvent::Discovered => {
                info!("🖱️ Turret mouse discovered");
                self.sink.mouse_discovered();
            }
            PollerEvent::Disconnected => {
                warn!("Turret mouse disconnected");
                self.sink.mouse_disconnected();
            }
            PollerEvent::Report(bytes) => {
                self.publish(&bytes);
                self.sink.report_received(&bytes);
            }
        }
    }

    fn publish(&self, bytes: &[u8]) {
        let Some(report) = MouseReport::parse(bytes) else {
            debug!("Ignoring {}-byte report", bytes.len());
            return;
        };

        let published = {
            let mut cursor = lock(&self.cursor);
            cursor.apply(&report);
            let (_, height) = cursor.display_resolution();
            cursor.poll().with_inverted_y(height)
        };

        *lock(&self.info) = published;

        match self.published.try_send(published) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => trace!("Published channel full, dropping value"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

fn sleep_while_running(running: &AtomicBool, duration: Duration) {
    let deadline = Instant::now() + duration;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(SLEEP_SLICE_MS)));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
