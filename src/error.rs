//! Error types for the workout tracker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkoutError {
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Exercise cannot be skipped: {0}")]
    NotSkippable(String),

    #[error("Exercise has no countdown timer: {0}")]
    NoCountdown(String),

    #[error("Invalid routine: {0}")]
    InvalidRoutine(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, WorkoutError>;
