//! Cross-platform helpers shared across the launcher.

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, format_bytes};
