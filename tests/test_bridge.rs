//! End-to-end tests for the input bridge over a scripted device source

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use turret_input::config::Config;
use turret_input::hid::{MockMouseSink, ScriptedDevice, ScriptedSource, RAZER_VENDOR_ID};
use turret_input::turret::BUTTON_LEFT;
use turret_input::{BridgeError, InputBridge};

const MOUSE_DESC: [u8; 6] = [0x05, 0x01, 0x09, 0x02, 0xA1, 0x01];
const WAIT: Duration = Duration::from_secs(5);

fn fast_config() -> Config {
    let mut config = Config::default();
    config.poller.rediscovery_interval_ms = 20;
    config
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_reports_reach_side_channel() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = ScriptedSource::new();
    source.insert(
        "/dev/input/hidraw3",
        ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID)
            .with_report(&[BUTTON_LEFT, 0, 0, 0x02, 0x0A, 0x00, 0x14, 0x00])
            .with_report(&[0x00, 0, 0, 0x00, 0xFB, 0xFF, 0x00, 0x00]),
    );
    let sink = Arc::new(MockMouseSink::new());
    let mut bridge = InputBridge::with_source(fast_config(), Box::new(source.clone()), sink.clone());
    let published = bridge.published_receiver().clone();

    bridge.start().unwrap();

    let first = published.recv_timeout(WAIT).unwrap();
    assert_eq!(first.buttons, 1);
    assert_eq!((first.delta_x, first.delta_y, first.wheel), (10, 20, 2));
    assert_eq!((first.screen_x, first.screen_y), (10, 1060));

    let second = published.recv_timeout(WAIT).unwrap();
    assert_eq!(second.buttons, 0);
    assert_eq!((second.delta_x, second.delta_y, second.wheel), (-5, 0, 0));
    assert_eq!((second.screen_x, second.screen_y), (5, 1060));

    // The script ends in a read error; the mouse comes back on rediscovery
    assert!(wait_for(|| sink.disconnected_count() >= 1));
    assert!(wait_for(|| sink.discovered_count() >= 2));

    source.remove(Path::new("/dev/input/hidraw3"));
    bridge.stop();
    assert!(!bridge.is_running());
    assert_eq!(sink.reports()[0], vec![BUTTON_LEFT, 0, 0, 0x02, 0x0A, 0x00, 0x14, 0x00]);
}

#[test]
fn test_host_writes_side_channel() {
    let sink = Arc::new(MockMouseSink::new());
    let bridge = InputBridge::with_source(fast_config(), Box::new(ScriptedSource::new()), sink);

    for index in 0..6 {
        bridge.set_side_channel_value(index, index * 10);
    }
    bridge.set_side_channel_value(6, 1000);

    for index in 0..6 {
        assert_eq!(bridge.side_channel_value(index), index * 10);
    }
    assert_eq!(bridge.side_channel_value(6), 0);
}

#[test]
fn test_foreign_vendor_never_publishes() {
    let source = ScriptedSource::new();
    source.insert(
        "/dev/input/hidraw0",
        ScriptedDevice::new(&MOUSE_DESC, 0x046d).with_report(&[1, 0, 0, 0, 1, 0, 1, 0]),
    );
    let sink = Arc::new(MockMouseSink::new());
    let mut bridge = InputBridge::with_source(fast_config(), Box::new(source), sink.clone());
    let published = bridge.published_receiver().clone();

    bridge.start().unwrap();
    assert!(wait_for(|| sink.discovered_count() >= 2));
    bridge.stop();

    assert!(published.try_recv().is_err());
    assert!(sink.reports().is_empty());
    assert_eq!(sink.disconnected_count(), 0);
}

#[test]
fn test_display_resolution_applies_to_inversion() {
    let source = ScriptedSource::new();
    source.insert(
        "/dev/input/hidraw0",
        ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID).with_report(&[0, 0, 0, 0, 0x64, 0, 0x32, 0]),
    );
    let sink = Arc::new(MockMouseSink::new());
    let mut bridge = InputBridge::with_source(fast_config(), Box::new(source), sink);
    bridge.set_display_resolution(800, 600);
    bridge.set_sensitivity(2.0, 2.0);
    let published = bridge.published_receiver().clone();

    bridge.start().unwrap();
    let info = published.recv_timeout(WAIT).unwrap();
    bridge.stop();

    assert_eq!((info.screen_x, info.screen_y), (200, 500));
    assert_eq!((info.delta_x, info.delta_y), (100, 50));
}

#[test]
fn test_stop_during_discovery_does_not_read() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = ScriptedSource::new();
    source.insert(
        "/dev/input/hidraw0",
        ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID).with_report(&[1, 0, 0, 0, 1, 0, 1, 0]),
    );
    source.hold_opens();
    let sink = Arc::new(MockMouseSink::new());
    let mut bridge = InputBridge::with_source(fast_config(), Box::new(source.clone()), sink.clone());

    bridge.start().unwrap();
    assert!(wait_for(|| source.blocked_opens() == 1));

    // Poller is inside discovery when the stop lands
    bridge.stop();
    source.release_opens();

    assert!(wait_for(|| !bridge.threads_alive()));
    assert_eq!(source.open_count(), 1);
    assert!(!bridge.poller().is_reading_allowed());
    assert!(sink.reports().is_empty());
}

#[test]
fn test_restart_waits_for_previous_threads() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = ScriptedSource::new();
    source.insert(
        "/dev/input/hidraw0",
        ScriptedDevice::new(&MOUSE_DESC, RAZER_VENDOR_ID).with_report(&[0, 0, 0, 0, 0x03, 0, 0x04, 0]),
    );
    source.hold_opens();
    let sink = Arc::new(MockMouseSink::new());
    let mut bridge = InputBridge::with_source(fast_config(), Box::new(source.clone()), sink.clone());
    let published = bridge.published_receiver().clone();

    bridge.start().unwrap();
    assert!(wait_for(|| source.blocked_opens() == 1));
    bridge.stop();

    // Old poller still blocked, a second generation must not start
    assert!(matches!(bridge.start(), Err(BridgeError::StillStopping)));
    assert!(!bridge.is_running());
    assert!(bridge.threads_alive());

    source.release_opens();
    assert!(wait_for(|| bridge.start().is_ok()));
    assert!(bridge.is_running());

    let info = published.recv_timeout(WAIT).unwrap();
    assert_eq!((info.delta_x, info.delta_y), (3, 4));

    bridge.stop();
    assert!(wait_for(|| !bridge.threads_alive()));
}
