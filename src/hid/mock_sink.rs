//! Recording mouse sink for testing.
//!
//! Logs every notification the way the real consumer would see it and keeps
//! a copy so tests can assert on order and count. An action can be attached
//! to fire once a number of reports have arrived, the same way a consumer
//! stops the read loop (or the device goes away) from inside a callback.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use log::info;

use super::poller::ReadGate;
use super::MouseSink;

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Discovered,
    Disconnected,
    Report(Vec<u8>),
}

type ReportAction = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockMouseSink {
    events: Mutex<Vec<SinkEvent>>,
    after_reports: Mutex<Option<(usize, ReportAction)>>,
}

impl fmt::Debug for MockMouseSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockMouseSink")
            .field("events", &self.lock().len())
            .finish_non_exhaustive()
    }
}

impl MockMouseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` on every report from the `reports`th on
    pub fn after_reports(&self, reports: usize, action: impl Fn() + Send + Sync + 'static) {
        *self.after_reports.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((reports, Box::new(action)));
    }

    /// Close `gate` once `reports` reports have arrived
    pub fn stop_after(&self, reports: usize, gate: ReadGate) {
        self.after_reports(reports, move || gate.close());
    }

    /// Everything received so far
    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    pub fn discovered_count(&self) -> usize {
        self.count(|e| matches!(e, SinkEvent::Discovered))
    }

    pub fn disconnected_count(&self) -> usize {
        self.count(|e| matches!(e, SinkEvent::Disconnected))
    }

    /// Received reports in arrival order
    pub fn reports(&self) -> Vec<Vec<u8>> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Report(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MouseSink for MockMouseSink {
    fn mouse_discovered(&self) {
        info!("[MOCK SINK] Mouse discovered");
        self.lock().push(SinkEvent::Discovered);
    }

    fn mouse_disconnected(&self) {
        info!("[MOCK SINK] Mouse disconnected");
        self.lock().push(SinkEvent::Disconnected);
    }

    fn report_received(&self, report: &[u8]) {
        info!("[MOCK SINK] Report: {:02x?}", report);
        let received = {
            let mut events = self.lock();
            events.push(SinkEvent::Report(report.to_vec()));
            events.iter().filter(|e| matches!(e, SinkEvent::Report(_))).count()
        };

        let hook = self.after_reports.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((limit, action)) = hook.as_ref() {
            if received >= *limit {
                action();
            }
        }
    }
}
