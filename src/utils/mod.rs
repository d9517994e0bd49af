//! Utility functions module
//!
//! Time formatting and signal handling shared across the application.

pub mod format;
pub mod signals;

pub use format::{format_clock, format_elapsed, format_uptime};
pub use signals::shutdown_signal;
