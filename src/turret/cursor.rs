//! Cursor accumulation
//!
//! Raw deltas are summed as-is between polls. The cursor position moves by
//! the delta times the axis sensitivity and is held inside
//! `[0, width] x [0, height]`. The wheel sums to at most ±127.

use log::{debug, trace};

use super::info::TurretMouseInfo;
use super::report::MouseReport;
use crate::config::CursorSettings;

/// Wheel accumulator bound
pub const WHEEL_LIMIT: i32 = 127;

#[derive(Debug, Clone, PartialEq)]
pub struct CursorTracker {
    display_width: i32,
    display_height: i32,
    sensitivity_x: f64,
    sensitivity_y: f64,
    pos_x: f64,
    pos_y: f64,
    buttons: i32,
    delta_x: i32,
    delta_y: i32,
    wheel: i32,
}

impl CursorTracker {
    /// Cursor at the origin of a `width` x `height` display
    pub fn new(display_width: i32, display_height: i32) -> Self {
        Self {
            display_width,
            display_height,
            sensitivity_x: 1.0,
            sensitivity_y: 1.0,
            pos_x: 0.0,
            pos_y: 0.0,
            buttons: 0,
            delta_x: 0,
            delta_y: 0,
            wheel: 0,
        }
    }

    pub fn from_settings(settings: &CursorSettings) -> Self {
        let mut cursor = Self::new(settings.display_width, settings.display_height);
        cursor.set_sensitivity(settings.sensitivity_x.into(), settings.sensitivity_y.into());
        cursor
    }

    /// Fold one report into the accumulators
    pub fn apply(&mut self, report: &MouseReport) {
        let dx = i32::from(report.delta_x);
        let dy = i32::from(report.delta_y);

        self.buttons = i32::from(report.buttons);
        self.delta_x = self.delta_x.saturating_add(dx);
        self.delta_y = self.delta_y.saturating_add(dy);

        self.pos_x = (self.pos_x + f64::from(dx) * self.sensitivity_x)
            .clamp(0.0, f64::from(self.display_width.max(0)));
        self.pos_y = (self.pos_y + f64::from(dy) * self.sensitivity_y)
            .clamp(0.0, f64::from(self.display_height.max(0)));

        self.wheel = (self.wheel + i32::from(report.wheel)).clamp(-WHEEL_LIMIT, WHEEL_LIMIT);

        trace!(
            "Cursor ({:.1}, {:.1}) buttons {:#04x} wheel {}",
            self.pos_x,
            self.pos_y,
            self.buttons,
            self.wheel
        );
    }

    /// Change the display size, scaling the cursor position to match.
    ///
    /// The position is left alone when the previous size had a zero side,
    /// since there is nothing to scale from.
    pub fn set_display_resolution(&mut self, width: i32, height: i32) {
        debug!(
            "Display resolution {}x{} -> {}x{}",
            self.display_width, self.display_height, width, height
        );
        if self.display_width != 0 {
            self.pos_x *= f64::from(width) / f64::from(self.display_width);
        }
        if self.display_height != 0 {
            self.pos_y *= f64::from(height) / f64::from(self.display_height);
        }
        self.display_width = width;
        self.display_height = height;
    }

    pub fn display_resolution(&self) -> (i32, i32) {
        (self.display_width, self.display_height)
    }

    /// Move the cursor without clamping
    pub fn set_cursor_position(&mut self, x: i32, y: i32) {
        self.pos_x = f64::from(x);
        self.pos_y = f64::from(y);
    }

    pub fn cursor_position(&self) -> (i32, i32) {
        (self.pos_x as i32, self.pos_y as i32)
    }

    pub fn set_sensitivity(&mut self, sensitivity_x: f64, sensitivity_y: f64) {
        self.sensitivity_x = sensitivity_x;
        self.sensitivity_y = sensitivity_y;
    }

    pub fn sensitivity(&self) -> (f64, f64) {
        (self.sensitivity_x, self.sensitivity_y)
    }

    /// Current state; deltas and wheel start over afterwards
    pub fn poll(&mut self) -> TurretMouseInfo {
        let info = TurretMouseInfo {
            buttons: self.buttons,
            delta_x: self.delta_x,
            delta_y: self.delta_y,
            wheel: self.wheel,
            screen_x: self.pos_x as i32,
            screen_y: self.pos_y as i32,
        };
        self.delta_x = 0;
        self.delta_y = 0;
        self.wheel = 0;
        info
    }
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::from_settings(&CursorSettings::default())
    }
}
