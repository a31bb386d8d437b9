//! Raw HID mouse constants
//!
//! This module contains the values the poller needs to find and read the
//! turret mouse:
//! - hidraw device path layout
//! - Vendor id and descriptor signature
//! - Report sizes and ioctl buffer sizes

// ============================================================================
// Discovery
// ============================================================================

/// Device path prefix; candidates are `prefix + index`
pub const HIDRAW_PATH_PREFIX: &str = "/dev/input/hidraw";

/// Number of candidate paths scanned per discovery pass
pub const SCAN_COUNT: u32 = 20;

/// Razer USB vendor id
pub const RAZER_VENDOR_ID: u16 = 0x1532;

/// Weighted value of the first four descriptor bytes of a boot-protocol
/// mouse (`05 01 09 02`: Usage Page Generic Desktop, Usage Mouse)
pub const BOOT_MOUSE_SIGNATURE: u32 = 5192;

/// Number of leading descriptor bytes folded into the signature
pub const SIGNATURE_LEN: usize = 4;

/// Delay between discovery passes while no mouse is connected (milliseconds)
pub const REDISCOVERY_INTERVAL_MS: u64 = 3000;

// ============================================================================
// Reports
// ============================================================================

/// Size of one input report read from the mouse
pub const REPORT_SIZE: usize = 8;

/// Largest report descriptor the kernel hands out
pub const HID_MAX_DESCRIPTOR_SIZE: usize = 4096;

/// Buffer size for `HIDIOCGRAWNAME`
pub const RAW_NAME_LEN: usize = 256;

// ============================================================================
// Bus types (linux/input.h)
// ============================================================================

pub const BUS_USB: u32 = 0x03;
pub const BUS_HIL: u32 = 0x04;
pub const BUS_BLUETOOTH: u32 = 0x05;
pub const BUS_VIRTUAL: u32 = 0x06;
