//! Worker tasks for the blocking poller calls
//!
//! Discovery and the read loop block on device I/O for as long as a mouse
//! is plugged in. They require a [`BlockingContext`], and the only ways to
//! get one are a tokio blocking task ([`PollerWorker`]) or a dedicated
//! named thread ([`BlockingContext::spawn_thread`]).

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::thread;

use log::debug;
use tokio::task;

use super::poller::MousePoller;
use super::{HidError, MouseSink};

/// Proof that the caller runs on a thread allowed to block
#[derive(Debug)]
pub struct BlockingContext {
    _private: (),
}

impl BlockingContext {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    /// Run `f` on a new named thread with a context
    pub fn spawn_thread<F, T>(name: &str, f: F) -> io::Result<thread::JoinHandle<T>>
    where
        F: FnOnce(&BlockingContext) -> T + Send + 'static,
        T: Send + 'static,
    {
        thread::Builder::new().name(name.to_string()).spawn(move || {
            debug!("Blocking worker thread started");
            f(&BlockingContext::new())
        })
    }
}

/// Runs poller operations on tokio's blocking pool
#[derive(Clone)]
pub struct PollerWorker {
    poller: Arc<MousePoller>,
}

impl PollerWorker {
    pub fn new(poller: Arc<MousePoller>) -> Self {
        Self { poller }
    }

    pub fn poller(&self) -> &Arc<MousePoller> {
        &self.poller
    }

    /// Start one discovery pass. Must be called inside a tokio runtime.
    pub fn spawn_discovery(
        &self,
        sink: Arc<dyn MouseSink>,
    ) -> impl Future<Output = Result<bool, HidError>> + Send + 'static {
        let poller = Arc::clone(&self.poller);
        let handle = task::spawn_blocking(move || {
            poller.discover_mouse(&BlockingContext::new(), sink.as_ref())
        });
        async move { handle.await.map_err(|e| HidError::Worker(e.to_string())) }
    }

    /// Start the read loop on the recorded path. Resolves to
    /// [`HidError::MissingDevice`] when discovery has not recorded one.
    /// Must be called inside a tokio runtime.
    pub fn spawn_read_loop(
        &self,
        sink: Arc<dyn MouseSink>,
    ) -> impl Future<Output = Result<(), HidError>> + Send + 'static {
        let poller = Arc::clone(&self.poller);
        let handle = task::spawn_blocking(move || {
            if poller.mouse_path().is_none() {
                return Err(HidError::MissingDevice);
            }
            poller.read_report_loop(&BlockingContext::new(), sink.as_ref());
            Ok(())
        });
        async move { handle.await.map_err(|e| HidError::Worker(e.to_string()))? }
    }

    /// Same as [`MousePoller::stop_read_report_loop`]
    pub fn stop(&self) -> bool {
        self.poller.stop_read_report_loop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_thread_is_named() {
        let handle = BlockingContext::spawn_thread("blocking-test", |_ctx| {
            thread::current().name().map(str::to_string)
        })
        .unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("blocking-test"));
    }
}
