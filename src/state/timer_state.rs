//! Per-exercise countdown timer

use serde::Serialize;

use crate::{catalog::Exercise, utils::format::format_clock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Paused,
    Running,
    /// Countdown reached zero; terminal
    Complete,
}

/// Countdown state for one timed exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTimer {
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub phase: TimerPhase,
}

impl ExerciseTimer {
    /// Create a paused timer with the full countdown remaining
    pub fn new(seconds: u32) -> Self {
        Self {
            total_seconds: seconds,
            remaining_seconds: seconds,
            phase: TimerPhase::Paused,
        }
    }

    /// Timer for an exercise, if its duration spec is timed
    pub fn for_exercise(exercise: &Exercise) -> Option<Self> {
        exercise.duration_spec().countdown_seconds().map(Self::new)
    }

    /// Start counting down. Returns true if the timer was not already
    /// running or complete.
    pub fn start(&mut self) -> bool {
        match self.phase {
            TimerPhase::Running | TimerPhase::Complete => false,
            TimerPhase::Paused if self.remaining_seconds == 0 => {
                self.phase = TimerPhase::Complete;
                false
            }
            TimerPhase::Paused => {
                self.phase = TimerPhase::Running;
                true
            }
        }
    }

    /// Stop a running countdown. Returns true if it was running.
    pub fn pause(&mut self) -> bool {
        if self.phase == TimerPhase::Running {
            self.phase = TimerPhase::Paused;
            true
        } else {
            false
        }
    }

    /// Advance one second while running
    pub fn tick(&mut self) -> TimerPhase {
        if self.phase != TimerPhase::Running {
            return self.phase;
        }

        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            self.phase = TimerPhase::Complete;
        } else {
            self.remaining_seconds -= 1;
        }
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_complete(&self) -> bool {
        self.phase == TimerPhase::Complete
    }

    /// "m:ss" while counting, "Complete!" once done
    pub fn display(&self) -> String {
        if self.is_complete() {
            "Complete!".to_string()
        } else {
            format_clock(u64::from(self.remaining_seconds))
        }
    }
}
