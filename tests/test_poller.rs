//! Integration tests for mouse discovery and the read loop on worker tasks

use std::path::PathBuf;
use std::sync::Arc;

use turret_input::config::PollerSettings;
use turret_input::hid::*;

const MOUSE_DESC: [u8; 8] = [0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, 0x09, 0x01];

fn worker(source: &ScriptedSource) -> PollerWorker {
    let poller = MousePoller::new(PollerSettings::default(), Box::new(source.clone()));
    PollerWorker::new(Arc::new(poller))
}

#[tokio::test]
async fn test_discovery_then_read_on_worker() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = ScriptedSource::new();
    source.insert(
        "/dev/input/hidraw5",
        ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID)
            .with_name("Razer Turret Mouse")
            .with_report(&[0x02, 0, 0, 0, 0x03, 0x00, 0x00, 0x00])
            .with_report(&[0x00, 0, 0, 0xFF, 0x00, 0x00, 0x03, 0x00]),
    );
    let worker = worker(&source);
    let sink = Arc::new(MockMouseSink::new());

    let found = worker.spawn_discovery(sink.clone()).await.unwrap();
    assert!(found);
    assert_eq!(
        worker.poller().mouse_path(),
        Some(PathBuf::from("/dev/input/hidraw5"))
    );

    worker.spawn_read_loop(sink.clone()).await.unwrap();
    assert_eq!(
        sink.events(),
        vec![
            SinkEvent::Discovered,
            SinkEvent::Report(vec![0x02, 0, 0, 0, 0x03, 0x00, 0x00, 0x00]),
            SinkEvent::Report(vec![0x00, 0, 0, 0xFF, 0x00, 0x00, 0x03, 0x00]),
            SinkEvent::Disconnected,
        ]
    );
}

#[tokio::test]
async fn test_empty_scan() {
    let worker = worker(&ScriptedSource::new());
    let sink = Arc::new(MockMouseSink::new());

    assert!(!worker.spawn_discovery(sink.clone()).await.unwrap());
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_read_without_discovery() {
    let worker = worker(&ScriptedSource::new());
    let sink = Arc::new(MockMouseSink::new());

    let result = worker.spawn_read_loop(sink.clone()).await;
    assert!(matches!(result, Err(HidError::MissingDevice)));
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_stop_from_worker() {
    let source = ScriptedSource::new();
    let mut device = ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID);
    for _ in 0..10 {
        device = device.with_report(&[0; 8]);
    }
    source.insert("/dev/input/hidraw0", device);
    let worker = worker(&source);
    let sink = Arc::new(MockMouseSink::new());

    assert!(worker.spawn_discovery(sink.clone()).await.unwrap());
    sink.stop_after(3, worker.poller().read_gate());
    worker.spawn_read_loop(sink.clone()).await.unwrap();

    assert_eq!(sink.reports().len(), 3);
    assert_eq!(sink.disconnected_count(), 0);
    assert!(worker.stop());
}

#[test]
fn test_named_blocking_thread() {
    let source = ScriptedSource::new();
    source.insert(
        "/dev/input/hidraw2",
        ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID).with_report(&[0x01, 0, 0, 0, 0, 0, 0, 0]),
    );
    let poller = Arc::new(MousePoller::new(PollerSettings::default(), Box::new(source)));
    let sink = Arc::new(MockMouseSink::new());

    let handle = {
        let poller = Arc::clone(&poller);
        let sink = Arc::clone(&sink);
        BlockingContext::spawn_thread("hid-test", move |ctx| {
            if poller.discover_mouse(ctx, &*sink) {
                poller.read_report_loop(ctx, &*sink);
            }
        })
        .unwrap()
    };
    handle.join().unwrap();

    assert_eq!(sink.discovered_count(), 1);
    assert_eq!(sink.reports(), vec![vec![0x01, 0, 0, 0, 0, 0, 0, 0]]);
    assert_eq!(sink.disconnected_count(), 1);
    assert!(!poller.is_reading_allowed());
}

#[test]
fn test_custom_prefix_and_vendor() {
    let settings = PollerSettings {
        device_prefix: "/dev/hidraw".to_string(),
        scan_count: 2,
        vendor_id: 0x046d,
        ..PollerSettings::default()
    };
    let source = ScriptedSource::new();
    source.insert("/dev/hidraw1", ScriptedDevice::new(&MOUSE_DESC, 0x046d));
    source.insert("/dev/input/hidraw0", ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID));
    let poller = Arc::new(MousePoller::new(settings, Box::new(source)));
    let sink = Arc::new(MockMouseSink::new());

    let found = {
        let poller = Arc::clone(&poller);
        let sink = Arc::clone(&sink);
        BlockingContext::spawn_thread("hid-test", move |ctx| poller.discover_mouse(ctx, &*sink))
            .unwrap()
            .join()
            .unwrap()
    };

    assert!(found);
    assert_eq!(poller.mouse_path(), Some(PathBuf::from("/dev/hidraw1")));
}
