//! Controller input state tracking
//!
//! This module mirrors the host's controller input pipeline:
//! - Per-device axis values
//! - Button levels with press/release edge detection
//! - Frame commits that freeze edges for querying

pub mod constants;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use state::*;
pub use types::*;
