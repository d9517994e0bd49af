//! ATG Workout - A state-managed HTTP server that tracks a workout routine
//!
//! This library provides the workout session controller, exercise countdown
//! timers, snapshot persistence and the HTTP API driving them.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod persistence;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use catalog::{DurationSpec, Exercise, Routine};
pub use config::Config;
pub use error::{Result, WorkoutError};
pub use persistence::{FileStore, MemoryStore, SessionSnapshot, SnapshotStore};
pub use state::{AppState, WorkoutSession};
pub use utils::signals::shutdown_signal;
