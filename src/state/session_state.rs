//! Mutable session progress

use serde::Serialize;

use crate::{
    catalog::Routine,
    persistence::SessionSnapshot,
};

/// Progress through one run of the routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Completed exercise ids in completion order
    pub completed: Vec<String>,
    /// Exercise currently in progress
    pub active: Option<String>,
    /// Session start, epoch millis
    pub start_time: i64,
    /// Total paused duration excluded from elapsed time, millis
    pub paused_accumulated: i64,
    /// When the current pause began; `Some` exactly while paused
    pub pause_started_at: Option<i64>,
}

impl SessionState {
    /// A new session positioned at the first exercise
    pub fn fresh(routine: &Routine, now: i64) -> Self {
        Self {
            completed: Vec::new(),
            active: routine.first_id().map(str::to_string),
            start_time: now,
            paused_accumulated: 0,
            pause_started_at: None,
        }
    }

    /// Restore progress from a snapshot. Pauses are not persisted, so a
    /// restored session is always running.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            completed: snapshot.completed,
            active: snapshot.active,
            start_time: snapshot.start_time,
            paused_accumulated: snapshot.paused_time,
            pause_started_at: None,
        }
    }

    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            completed: self.completed.clone(),
            active: self.active.clone(),
            start_time: self.start_time,
            paused_time: self.paused_accumulated,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|done| done == id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.as_deref() == Some(id)
    }
}
