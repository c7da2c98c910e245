//! Backend client contract and its error type

use async_trait::async_trait;
use thiserror::Error;

use crate::state::{NewTask, Task, TimerSettings};

/// Errors that can occur when talking to the backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Requested record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Remote store for settings and tasks
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn fetch_settings(&self) -> Result<TimerSettings, BackendError>;

    async fn save_settings(&self, settings: &TimerSettings) -> Result<(), BackendError>;

    async fn create_task(&self, task: &NewTask) -> Result<Task, BackendError>;

    /// Credit one finished focus session to a task
    async fn complete_pomodoro(&self, task_id: &str) -> Result<(), BackendError>;
}
