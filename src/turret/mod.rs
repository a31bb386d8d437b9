//! Turret mouse report decoding
//!
//! Turns raw 8-byte reports into the six-value side channel the host reads:
//! - Report layout and button masks ([`MouseReport`])
//! - Delta, wheel and cursor accumulation ([`CursorTracker`])
//! - The side channel itself ([`TurretMouseInfo`])

pub mod cursor;
pub mod info;
pub mod report;

pub use cursor::{CursorTracker, WHEEL_LIMIT};
pub use info::{TurretError, TurretField, TurretMouseInfo, SIDE_CHANNEL_LEN};
pub use report::*;
