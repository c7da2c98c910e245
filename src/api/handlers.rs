//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, ControlError, NewTask, SessionType, TimerSettings, TimerState};
use super::responses::{
    ApiResponse, HealthResponse, SettingsResponse, StatusResponse, TaskListResponse, TaskResponse,
};

type ErrorReply = (StatusCode, Json<ApiResponse>);

/// Wrap a timer operation result, logging lock failures as 500s
fn timer_reply(
    operation: &str,
    result: Result<TimerState, String>,
    message: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(timer) => {
            info!("{} endpoint called", operation);
            Ok(Json(ApiResponse::ok(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", operation, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn control_error(state: &AppState, e: ControlError) -> ErrorReply {
    let status = match &e {
        ControlError::InvalidSettings(_) | ControlError::InvalidTask(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ControlError::UnknownTask(_) => StatusCode::NOT_FOUND,
        ControlError::Backend(_) => StatusCode::BAD_GATEWAY,
        ControlError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("Request rejected ({}): {}", status, e);
    (status, Json(ApiResponse::error(e.to_string(), state.get_timer_state().ok())))
}

/// Handle GET /timer - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_timer_state() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        clock: StatusResponse::clock_for(&timer),
        timer,
        errors: state.get_errors(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle POST /timer/start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("start", state.start(), "Timer running")
}

/// Handle POST /timer/pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("pause", state.pause(), "Timer paused")
}

/// Handle POST /timer/reset - Rewind the current session
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("reset", state.reset(), "Timer reset")
}

/// Handle POST /timer/skip - Finish the current session now
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("skip", state.skip(), "Session skipped")
}

/// Handle POST /timer/session/:session_type - Switch session type
pub async fn switch_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_type): Path<String>,
) -> Result<Json<ApiResponse>, ErrorReply> {
    let session_type: SessionType = session_type.parse().map_err(|e: String| {
        warn!("{}", e);
        (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e, state.get_timer_state().ok())))
    })?;

    match state.switch_session_type(session_type) {
        Ok(timer) => Ok(Json(ApiResponse::ok(format!("Session type is {}", session_type), timer))),
        Err(e) => {
            error!("Failed to switch session type: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(e, None))))
        }
    }
}

/// Handle GET /settings - Return the active settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<SettingsResponse>, StatusCode> {
    match state.get_settings() {
        Ok(settings) => Ok(Json(SettingsResponse::new(settings, None, None))),
        Err(e) => {
            error!("Failed to get settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /settings - Replace settings and reset the timer
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<TimerSettings>,
) -> Result<Json<SettingsResponse>, ErrorReply> {
    match state.save_settings(settings.clone()).await {
        Ok(timer) => {
            info!("Settings endpoint called - settings replaced");
            Ok(Json(SettingsResponse::new(settings, Some(timer), None)))
        }
        // Applied locally but not persisted
        Err(ControlError::Backend(message)) => Ok(Json(SettingsResponse::new(
            settings,
            state.get_timer_state().ok(),
            Some(message),
        ))),
        Err(e) => Err(control_error(&state, e)),
    }
}

/// Handle GET /tasks - List local tasks
pub async fn list_tasks_handler(State(state): State<Arc<AppState>>) -> Result<Json<TaskListResponse>, StatusCode> {
    match state.get_tasks() {
        Ok(tasks) => Ok(Json(TaskListResponse { tasks })),
        Err(e) => {
            error!("Failed to list tasks: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /tasks - Create a task through the backend
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Json(new_task): Json<NewTask>,
) -> Result<(StatusCode, Json<TaskResponse>), ErrorReply> {
    match state.create_task(new_task).await {
        Ok(task) => Ok((StatusCode::CREATED, Json(TaskResponse::created(task)))),
        Err(e) => Err(control_error(&state, e)),
    }
}

/// Handle POST /tasks/:id/select - Put a task on the timer
pub async fn select_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<ApiResponse>, ErrorReply> {
    match state.select_task(&task_id) {
        Ok(timer) => Ok(Json(ApiResponse::ok(format!("Task {} selected", task_id), timer))),
        Err(e) => Err(control_error(&state, e)),
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
