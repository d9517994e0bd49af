//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{DurationSpec, Exercise},
    error::WorkoutError,
    state::{ExerciseTimer, SessionState, SessionView},
};

/// API response structure for session-changing endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, session: SessionView) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    pub fn ok(message: String, session: SessionView) -> Self {
        Self::new("ok", message, session)
    }

    /// The routine has been finished
    pub fn finished(message: String, session: SessionView) -> Self {
        Self::new("finished", message, session)
    }

    /// The request was valid but changed nothing
    pub fn unchanged(message: String, session: SessionView) -> Self {
        Self::new("unchanged", message, session)
    }
}

/// Body of POST /reset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Session status with derived time and progress figures
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub title: String,
    pub session: SessionView,
    pub progress_percent: f64,
    pub elapsed_ms: i64,
    pub elapsed: String,
    pub remaining_minutes: f64,
    pub uptime: String,
    pub host: String,
    pub port: u16,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// One exercise with its place in the current session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseView {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub completed: bool,
    pub active: bool,
    pub complete_label: String,
    pub duration: DurationSpec,
    pub timer: Option<ExerciseTimer>,
    pub timer_display: Option<String>,
}

impl ExerciseView {
    pub fn new(exercise: &Exercise, state: &SessionState, timer: Option<ExerciseTimer>) -> Self {
        Self {
            completed: state.is_completed(&exercise.id),
            active: state.is_active(&exercise.id),
            complete_label: exercise.complete_label(),
            duration: exercise.duration_spec(),
            timer_display: timer.as_ref().map(ExerciseTimer::display),
            timer,
            exercise: exercise.clone(),
        }
    }
}

/// Full routine listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineResponse {
    pub title: String,
    pub finished: bool,
    pub exercises: Vec<ExerciseView>,
}

/// Response for timer endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerResponse {
    pub exercise_id: String,
    pub display: String,
    pub timer: ExerciseTimer,
}

impl TimerResponse {
    pub fn new(exercise_id: &str, timer: ExerciseTimer) -> Self {
        Self {
            exercise_id: exercise_id.to_string(),
            display: timer.display(),
            timer,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

/// Workout errors mapped onto HTTP status codes
#[derive(Debug)]
pub struct ApiError(pub WorkoutError);

impl From<WorkoutError> for ApiError {
    fn from(error: WorkoutError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            WorkoutError::UnknownExercise(_) => StatusCode::NOT_FOUND,
            WorkoutError::NotSkippable(_) | WorkoutError::NoCountdown(_) => StatusCode::CONFLICT,
            WorkoutError::InvalidRoutine(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WorkoutError::Json(_) | WorkoutError::Io(_) | WorkoutError::Lock(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
