//! Controller tracker constants
//!
//! Slot count, host key actions and the axis/key codes the host input
//! pipeline uses for standard gamepads.

// ============================================================================
// Slots
// ============================================================================

/// Number of controller slots allocated by [`TrackerState::default`](super::TrackerState)
pub const MAX_DEVICES: usize = 4;

// ============================================================================
// Key actions
// ============================================================================

/// Host key event action for a press
pub const ACTION_DOWN: i32 = 0;

/// Host key event action for a release
pub const ACTION_UP: i32 = 1;

// ============================================================================
// Axis ids
// ============================================================================

pub const AXIS_X: i32 = 0;
pub const AXIS_Y: i32 = 1;
pub const AXIS_Z: i32 = 11;
pub const AXIS_RZ: i32 = 14;
pub const AXIS_HAT_X: i32 = 15;
pub const AXIS_HAT_Y: i32 = 16;
pub const AXIS_LTRIGGER: i32 = 17;
pub const AXIS_RTRIGGER: i32 = 18;

// ============================================================================
// Key codes
// ============================================================================

pub const KEYCODE_DPAD_UP: i32 = 19;
pub const KEYCODE_DPAD_DOWN: i32 = 20;
pub const KEYCODE_DPAD_LEFT: i32 = 21;
pub const KEYCODE_DPAD_RIGHT: i32 = 22;
pub const KEYCODE_BUTTON_A: i32 = 96;
pub const KEYCODE_BUTTON_B: i32 = 97;
pub const KEYCODE_BUTTON_X: i32 = 99;
pub const KEYCODE_BUTTON_Y: i32 = 100;
pub const KEYCODE_BUTTON_L1: i32 = 102;
pub const KEYCODE_BUTTON_R1: i32 = 103;
pub const KEYCODE_BUTTON_THUMBL: i32 = 106;
pub const KEYCODE_BUTTON_THUMBR: i32 = 107;
pub const KEYCODE_BUTTON_START: i32 = 108;
pub const KEYCODE_BUTTON_SELECT: i32 = 109;
pub const KEYCODE_MENU: i32 = 82;
