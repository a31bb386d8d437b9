//! Turret mouse input report layout
//!
//! | byte | meaning                        |
//! |------|--------------------------------|
//! | 0    | button mask                    |
//! | 3    | wheel delta (signed)           |
//! | 4-5  | X delta, little-endian signed  |
//! | 6-7  | Y delta, little-endian signed  |

use serde::Serialize;

use crate::hid::constants::REPORT_SIZE;

// ============================================================================
// Button masks (byte 0)
// ============================================================================

pub const BUTTON_LEFT: u8 = 0x01;
pub const BUTTON_RIGHT: u8 = 0x02;
pub const BUTTON_MIDDLE: u8 = 0x04;
pub const BUTTON_BACK: u8 = 0x08;
pub const BUTTON_FORWARD: u8 = 0x10;
pub const BUTTON_6: u8 = 0x20;
pub const BUTTON_7: u8 = 0x40;
pub const BUTTON_8: u8 = 0x80;

/// One decoded mouse report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MouseReport {
    pub buttons: u8,
    pub wheel: i8,
    pub delta_x: i16,
    pub delta_y: i16,
}

impl MouseReport {
    /// Decode a raw report. `None` when fewer than eight bytes are given;
    /// anything past the eighth byte is ignored.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < REPORT_SIZE {
            return None;
        }

        Some(Self {
            buttons: data[0],
            wheel: data[3] as i8,
            delta_x: i16::from_le_bytes([data[4], data[5]]),
            delta_y: i16::from_le_bytes([data[6], data[7]]),
        })
    }

    /// Is every button in `mask` held
    pub fn is_button_down(&self, mask: u8) -> bool {
        mask != 0 && self.buttons & mask == mask
    }
}
