//! Persisted form of a workout session

use serde::{Deserialize, Serialize};

/// Well-known key the session snapshot is stored under
pub const STATE_KEY: &str = "atgWorkoutState";

/// Session progress as written to the store after every mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Completed exercise ids in completion order
    pub completed: Vec<String>,
    pub active: Option<String>,
    /// Session start, epoch millis
    pub start_time: i64,
    /// Accumulated paused duration, millis
    pub paused_time: i64,
}
