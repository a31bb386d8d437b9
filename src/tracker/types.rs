//! Tracker type definitions
//!
//! Per-device axis and button records, the events fed into the tracker and
//! the serialisable snapshot used for diagnostics.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::constants::ACTION_DOWN;

/// Axis identifier as reported by the host input pipeline
pub type AxisId = i32;

/// Key code as reported by the host input pipeline
pub type KeyCode = i32;

/// A single input event pushed into the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A continuous axis changed
    Motion { device: i32, axis: AxisId, value: f32 },

    /// A button changed level
    Key { device: i32, key_code: KeyCode, is_down: bool },
}

impl InputEvent {
    /// Build a key event from a host key action (`ACTION_DOWN` = pressed,
    /// anything else = released)
    pub fn from_key_action(device: i32, key_code: KeyCode, action: i32) -> Self {
        Self::Key {
            device,
            key_code,
            is_down: action == ACTION_DOWN,
        }
    }
}

/// Button levels and edges for one device
///
/// Edges are recorded into the working sets only on a level change. A commit
/// replaces the `last_*` snapshots with the working sets and empties them.
#[derive(Debug, Clone, Default)]
pub struct ButtonState {
    held: HashSet<KeyCode>,
    down_edges: HashSet<KeyCode>,
    up_edges: HashSet<KeyCode>,
    last_down_edges: HashSet<KeyCode>,
    last_up_edges: HashSet<KeyCode>,
}

impl ButtonState {
    /// Apply a new level for `key`. Returns `true` if the level changed and
    /// an edge was recorded.
    pub fn set_level(&mut self, key: KeyCode, is_down: bool) -> bool {
        if is_down == self.held.contains(&key) {
            return false;
        }

        if is_down {
            self.held.insert(key);
            self.down_edges.insert(key);
        } else {
            self.held.remove(&key);
            self.up_edges.insert(key);
        }
        true
    }

    /// Is the button currently held
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Did the last committed frame contain a press of `key`
    pub fn committed_down(&self, key: KeyCode) -> bool {
        self.last_down_edges.contains(&key)
    }

    /// Did the last committed frame contain a release of `key`
    pub fn committed_up(&self, key: KeyCode) -> bool {
        self.last_up_edges.contains(&key)
    }

    /// Press recorded since the last commit (not yet visible to queries)
    pub fn pending_down(&self, key: KeyCode) -> bool {
        self.down_edges.contains(&key)
    }

    /// Release recorded since the last commit (not yet visible to queries)
    pub fn pending_up(&self, key: KeyCode) -> bool {
        self.up_edges.contains(&key)
    }

    /// Freeze this frame's edges into the committed snapshot
    pub fn commit(&mut self) {
        self.last_down_edges = std::mem::take(&mut self.down_edges);
        self.last_up_edges = std::mem::take(&mut self.up_edges);
    }

    /// Drop held levels and working edges. Committed snapshots are kept.
    pub fn clear(&mut self) {
        self.held.clear();
        self.down_edges.clear();
        self.up_edges.clear();
    }

    /// Keys currently held, in no particular order
    pub fn held_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held.iter().copied()
    }
}

/// Input record for one device slot
#[derive(Debug, Clone, Default)]
pub struct DeviceInput {
    axes: HashMap<AxisId, f32>,
    buttons: ButtonState,
}

impl DeviceInput {
    /// Last value seen for `axis`, 0.0 if never set
    pub fn axis(&self, axis: AxisId) -> f32 {
        self.axes.get(&axis).copied().unwrap_or(0.0)
    }

    pub fn set_axis(&mut self, axis: AxisId, value: f32) {
        self.axes.insert(axis, value);
    }

    pub fn clear_axes(&mut self) {
        self.axes.clear();
    }

    pub fn buttons(&self) -> &ButtonState {
        &self.buttons
    }

    pub fn buttons_mut(&mut self) -> &mut ButtonState {
        &mut self.buttons
    }

    /// Number of axes with a stored value
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Ordered, serialisable copy of this record
    pub fn snapshot(&self, slot: usize) -> DeviceSnapshot {
        let mut held: Vec<KeyCode> = self.buttons.held_keys().collect();
        held.sort_unstable();

        DeviceSnapshot {
            slot,
            axes: self.axes.iter().map(|(k, v)| (*k, *v)).collect(),
            held,
        }
    }
}

/// Point-in-time copy of one device slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub slot: usize,
    pub axes: BTreeMap<AxisId, f32>,
    pub held: Vec<KeyCode>,
}
