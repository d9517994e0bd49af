//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::info;

use crate::{
    state::{AppState, CompletionOutcome, SessionView},
    utils::format_elapsed,
};
use super::responses::{
    ApiError, ApiResponse, ExerciseView, HealthResponse, ResetRequest, RoutineResponse,
    StatusResponse, TimerResponse,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn completion_response(
    id: &str,
    verb: &str,
    outcome: CompletionOutcome,
    session: SessionView,
) -> ApiResponse {
    match outcome {
        CompletionOutcome::AlreadyCompleted => {
            ApiResponse::unchanged(format!("Exercise {} was already completed", id), session)
        }
        CompletionOutcome::Advanced { active } => {
            let next = active.as_deref().unwrap_or("none");
            ApiResponse::ok(format!("Exercise {} {}, next: {}", id, verb, next), session)
        }
        CompletionOutcome::Finished => ApiResponse::finished(
            "Congratulations! You've completed the workout!".to_string(),
            session,
        ),
    }
}

/// Handle POST /exercises/:id/complete
pub async fn complete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let (outcome, session) = state.complete_exercise(&id)?;
    info!("Complete endpoint called for {}", id);
    Ok(Json(completion_response(&id, "completed", outcome, session)))
}

/// Handle POST /exercises/:id/skip
pub async fn skip_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let (outcome, session) = state.skip_exercise(&id)?;
    info!("Skip endpoint called for {}", id);
    Ok(Json(completion_response(&id, "skipped", outcome, session)))
}

/// Handle POST /pause - Toggle the session between paused and running
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    let session = state.toggle_pause()?;
    let message = if session.paused {
        "Workout paused"
    } else {
        "Workout resumed"
    };
    Ok(Json(ApiResponse::ok(message.to_string(), session)))
}

/// Handle POST /reset - Start over, only with `{"confirm": true}`.
/// A missing or unreadable body declines.
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<ResetRequest>>,
) -> ApiResult<ApiResponse> {
    let confirmed = request.is_some_and(|Json(request)| request.confirm);
    match state.reset(confirmed)? {
        Some(session) => Ok(Json(ApiResponse::ok(
            "Workout progress reset".to_string(),
            session,
        ))),
        None => {
            let session = state.get_session_view()?;
            Ok(Json(ApiResponse::unchanged(
                "Reset not confirmed".to_string(),
                session,
            )))
        }
    }
}

/// Handle POST /exercises/:id/timer/start
pub async fn timer_start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TimerResponse> {
    let timer = state.start_exercise_timer(&id)?;
    Ok(Json(TimerResponse::new(&id, timer)))
}

/// Handle POST /exercises/:id/timer/pause
pub async fn timer_pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TimerResponse> {
    let timer = state.pause_exercise_timer(&id)?;
    Ok(Json(TimerResponse::new(&id, timer)))
}

/// Handle GET /status - Return progress and timing
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let session = state.get_session_view()?;
    let elapsed_ms = state.elapsed_ms()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        title: state.routine.title.clone(),
        progress_percent: session.progress * 100.0,
        remaining_minutes: session.remaining_minutes,
        elapsed_ms,
        elapsed: format_elapsed(elapsed_ms),
        uptime: state.get_uptime(),
        host: state.host.clone(),
        port: state.port,
        last_action,
        last_action_time,
        session,
    }))
}

/// Handle GET /routine - List exercises with their session state
pub async fn routine_handler(State(state): State<Arc<AppState>>) -> ApiResult<RoutineResponse> {
    let timers = state.get_timers()?;
    let response = state.with_session(|session| RoutineResponse {
        title: state.routine.title.clone(),
        finished: session.is_finished(),
        exercises: state
            .routine
            .exercises
            .iter()
            .map(|exercise| {
                ExerciseView::new(exercise, session.state(), timers.get(&exercise.id).cloned())
            })
            .collect(),
    })?;
    Ok(Json(response))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
