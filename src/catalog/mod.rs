//! Exercise catalog module
//!
//! Static exercise definitions, duration parsing and the ordered routine.

pub mod duration;
pub mod routine;

pub use duration::DurationSpec;
pub use routine::{Exercise, Routine};
