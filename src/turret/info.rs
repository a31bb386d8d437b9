//! Turret mouse side channel
//!
//! Six integers describing the mouse as of the last publish. Hosts that
//! address it by index use [`TurretField`] order; everything else uses the
//! named fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of values in the side channel
pub const SIDE_CHANNEL_LEN: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurretError {
    #[error("Side channel index {0} out of range (0..{})", SIDE_CHANNEL_LEN)]
    IndexOutOfRange(i32),
}

/// Side channel slot, in index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurretField {
    Buttons = 0,
    DeltaX = 1,
    DeltaY = 2,
    Wheel = 3,
    ScreenX = 4,
    ScreenY = 5,
}

impl TurretField {
    pub const ALL: [TurretField; SIDE_CHANNEL_LEN] = [
        TurretField::Buttons,
        TurretField::DeltaX,
        TurretField::DeltaY,
        TurretField::Wheel,
        TurretField::ScreenX,
        TurretField::ScreenY,
    ];

    pub fn index(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for TurretField {
    type Error = TurretError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(TurretError::IndexOutOfRange(index))
    }
}

/// Mouse state published to the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurretMouseInfo {
    pub buttons: i32,
    pub delta_x: i32,
    pub delta_y: i32,
    pub wheel: i32,
    pub screen_x: i32,
    pub screen_y: i32,
}

impl TurretMouseInfo {
    pub fn field(&self, field: TurretField) -> i32 {
        match field {
            TurretField::Buttons => self.buttons,
            TurretField::DeltaX => self.delta_x,
            TurretField::DeltaY => self.delta_y,
            TurretField::Wheel => self.wheel,
            TurretField::ScreenX => self.screen_x,
            TurretField::ScreenY => self.screen_y,
        }
    }

    pub fn field_mut(&mut self, field: TurretField) -> &mut i32 {
        match field {
            TurretField::Buttons => &mut self.buttons,
            TurretField::DeltaX => &mut self.delta_x,
            TurretField::DeltaY => &mut self.delta_y,
            TurretField::Wheel => &mut self.wheel,
            TurretField::ScreenX => &mut self.screen_x,
            TurretField::ScreenY => &mut self.screen_y,
        }
    }

    /// Checked read by index
    pub fn get(&self, index: i32) -> Result<i32, TurretError> {
        TurretField::try_from(index).map(|f| self.field(f))
    }

    /// Checked write by index
    pub fn set(&mut self, index: i32, value: i32) -> Result<(), TurretError> {
        let field = TurretField::try_from(index)?;
        *self.field_mut(field) = value;
        Ok(())
    }

    /// Copy with `screen_y` measured from the bottom of the display
    pub fn with_inverted_y(mut self, display_height: i32) -> Self {
        self.screen_y = display_height - self.screen_y;
        self
    }

    /// Values in index order
    pub fn to_array(&self) -> [i32; SIDE_CHANNEL_LEN] {
        TurretField::ALL.map(|f| self.field(f))
    }
}
