//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{Task, TimerSettings, TimerState},
    utils::format_clock,
};

/// API response structure for timer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: Option<TimerState>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: Option<TimerState>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a response carrying the updated timer
    pub fn ok(message: String, timer: TimerState) -> Self {
        Self::new("ok", message, Some(timer))
    }

    /// Create an error response
    pub fn error(message: String, timer: Option<TimerState>) -> Self {
        Self::new("error", message, timer)
    }
}

/// Timer status with display helpers and recent errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    /// Remaining time as `mm:ss`
    pub clock: String,
    pub errors: Vec<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

impl StatusResponse {
    pub fn clock_for(timer: &TimerState) -> String {
        format_clock(timer.remaining_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub settings: TimerSettings,
    pub timer: Option<TimerState>,
    pub error: Option<String>,
}

impl SettingsResponse {
    pub fn new(settings: TimerSettings, timer: Option<TimerState>, error: Option<String>) -> Self {
        Self {
            status: (if error.is_some() { "error" } else { "ok" }).to_string(),
            timestamp: Utc::now(),
            settings,
            timer,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub task: Task,
}

impl TaskResponse {
    pub fn created(task: Task) -> Self {
        Self {
            status: "created".to_string(),
            timestamp: Utc::now(),
            task,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
