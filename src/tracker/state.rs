//! Per-device input state and edge detection
//!
//! [`TrackerState`] owns one [`DeviceInput`] per slot. The event producer
//! calls [`on_motion`](TrackerState::on_motion) / [`on_key`](TrackerState::on_key),
//! the consumer calls [`commit_edges`](TrackerState::commit_edges) once per
//! frame and then queries. Mutations and commits take `&mut self`, so they
//! cannot interleave with queries on another thread without the caller adding
//! its own lock.
//!
//! Device ids outside `[0, max_devices)` are folded into slot 0 by the
//! mutating calls. Queries with such an id return the zero value instead.

use log::{debug, trace};

use super::constants::MAX_DEVICES;
use super::types::{AxisId, DeviceInput, DeviceSnapshot, InputEvent, KeyCode};

/// Input state mirror for a fixed number of controller slots
#[derive(Debug, Clone)]
pub struct TrackerState {
    devices: Vec<DeviceInput>,
}

impl TrackerState {
    /// Allocate `max_devices` empty slots. With zero slots every operation is
    /// a no-op and every query returns the zero value.
    pub fn new(max_devices: usize) -> Self {
        debug!("Allocating tracker with {} device slot(s)", max_devices);
        Self {
            devices: vec![DeviceInput::default(); max_devices],
        }
    }

    /// Number of device slots
    pub fn max_devices(&self) -> usize {
        self.devices.len()
    }

    /// Read access to a slot's record
    pub fn device(&self, slot: usize) -> Option<&DeviceInput> {
        self.devices.get(slot)
    }

    /// Slot a mutation lands in: the id itself when in range, slot 0 otherwise
    fn update_slot(&self, device: i32) -> Option<usize> {
        if self.devices.is_empty() {
            return None;
        }
        match usize::try_from(device) {
            Ok(slot) if slot < self.devices.len() => Some(slot),
            _ => {
                trace!("Device {} out of range, using slot 0", device);
                Some(0)
            }
        }
    }

    /// Slot a query reads from: only in-range ids resolve
    fn query_slot(&self, device: i32) -> Option<&DeviceInput> {
        usize::try_from(device)
            .ok()
            .and_then(|slot| self.devices.get(slot))
    }

    /// Store the latest value of an axis
    pub fn on_motion(&mut self, device: i32, axis: AxisId, value: f32) {
        trace!("Motion device={} axis={} value={}", device, axis, value);
        if let Some(slot) = self.update_slot(device) {
            self.devices[slot].set_axis(axis, value);
        }
    }

    /// Apply a button level, recording an edge when it changes
    pub fn on_key(&mut self, device: i32, key_code: KeyCode, is_down: bool) {
        trace!("Key device={} key={} down={}", device, key_code, is_down);
        if let Some(slot) = self.update_slot(device) {
            if !self.devices[slot].buttons_mut().set_level(key_code, is_down) {
                trace!("Duplicate level for key {} on slot {}", key_code, slot);
            }
        }
    }

    /// Apply a host key action (`ACTION_DOWN` = pressed, anything else = released)
    pub fn on_key_action(&mut self, device: i32, key_code: KeyCode, action: i32) {
        self.apply(&InputEvent::from_key_action(device, key_code, action));
    }

    /// Dispatch an input event
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Motion { device, axis, value } => self.on_motion(device, axis, value),
            InputEvent::Key { device, key_code, is_down } => self.on_key(device, key_code, is_down),
        }
    }

    /// Last value of an axis, 0.0 for unknown devices or unset axes
    pub fn axis(&self, device: i32, axis: AxisId) -> f32 {
        self.query_slot(device).map_or(0.0, |d| d.axis(axis))
    }

    /// Is the button currently held
    pub fn is_pressed(&self, device: i32, key_code: KeyCode) -> bool {
        self.query_slot(device)
            .is_some_and(|d| d.buttons().is_held(key_code))
    }

    /// Was the button pressed during the last committed frame
    pub fn is_pressed_down(&self, device: i32, key_code: KeyCode) -> bool {
        self.query_slot(device)
            .is_some_and(|d| d.buttons().committed_down(key_code))
    }

    /// Was the button released during the last committed frame
    pub fn is_pressed_up(&self, device: i32, key_code: KeyCode) -> bool {
        self.query_slot(device)
            .is_some_and(|d| d.buttons().committed_up(key_code))
    }

    /// Freeze this frame's edges for every device and start a new frame
    pub fn commit_edges(&mut self) {
        for device in &mut self.devices {
            device.buttons_mut().commit();
        }
    }

    /// Forget every axis value
    pub fn clear_axes(&mut self) {
        debug!("Clearing axes on {} slot(s)", self.devices.len());
        for device in &mut self.devices {
            device.clear_axes();
        }
    }

    /// Forget held buttons and working edges. The last committed frame stays
    /// visible until the next [`commit_edges`](Self::commit_edges).
    pub fn clear_buttons(&mut self) {
        debug!("Clearing buttons on {} slot(s)", self.devices.len());
        for device in &mut self.devices {
            device.buttons_mut().clear();
        }
    }

    /// Serialisable copy of one in-range slot
    pub fn snapshot(&self, device: i32) -> Option<DeviceSnapshot> {
        let slot = usize::try_from(device).ok()?;
        self.devices.get(slot).map(|d| d.snapshot(slot))
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new(MAX_DEVICES)
    }
}
