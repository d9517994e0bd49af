//! State management module
//!
//! This module contains the session controller, exercise timers and the
//! shared application state wrapping them.

pub mod app_state;
pub mod session;
pub mod session_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{now_millis, AppState, ElapsedState, TimerUpdate};
pub use session::{CompletionOutcome, SessionView, WorkoutSession};
pub use session_state::SessionState;
pub use timer_state::{ExerciseTimer, TimerPhase};
