//! Report descriptor matching
//!
//! The poller does not parse descriptors. It folds the first four bytes into
//! a single number, each byte weighted by a power of ten, and compares that
//! against a known value. This matches one descriptor layout and nothing more.

use super::constants::SIGNATURE_LEN;

/// Weighted value of the leading descriptor bytes:
/// `b0 * 1000 + b1 * 100 + b2 * 10 + b3`.
///
/// Returns `None` when the descriptor is shorter than four bytes.
pub fn descriptor_signature(descriptor: &[u8]) -> Option<u32> {
    let head = descriptor.get(..SIGNATURE_LEN)?;
    Some(head.iter().fold(0u32, |acc, &b| acc * 10 + u32::from(b)))
}

/// Does the descriptor start with the given signature
pub fn is_boot_mouse(descriptor: &[u8], signature: u32) -> bool {
    descriptor_signature(descriptor) == Some(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::constants::BOOT_MOUSE_SIGNATURE;

    /// Standard boot mouse descriptor prefix
    const BOOT_MOUSE_PREFIX: [u8; 6] = [0x05, 0x01, 0x09, 0x02, 0xA1, 0x01];

    #[test]
    fn test_boot_mouse_signature() {
        assert_eq!(descriptor_signature(&BOOT_MOUSE_PREFIX), Some(5192));
        assert!(is_boot_mouse(&BOOT_MOUSE_PREFIX, BOOT_MOUSE_SIGNATURE));
    }

    #[test]
    fn test_keyboard_is_not_a_mouse() {
        // Usage Page Generic Desktop, Usage Keyboard
        let keyboard = [0x05, 0x01, 0x09, 0x06, 0xA1, 0x01];
        assert_eq!(descriptor_signature(&keyboard), Some(5196));
        assert!(!is_boot_mouse(&keyboard, BOOT_MOUSE_SIGNATURE));
    }

    #[test]
    fn test_bytes_above_nine_still_weighted() {
        assert_eq!(descriptor_signature(&[0x00, 0x00, 0x01, 0xFF]), Some(10 + 255));
        assert_eq!(descriptor_signature(&[0xFF, 0xFF, 0xFF, 0xFF]), Some(255 * 1111));
    }

    #[test]
    fn test_short_descriptor() {
        assert_eq!(descriptor_signature(&[]), None);
        assert_eq!(descriptor_signature(&[0x05, 0x01, 0x09]), None);
        assert!(!is_boot_mouse(&[0x05, 0x01, 0x09], BOOT_MOUSE_SIGNATURE));
    }
}
