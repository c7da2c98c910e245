//! Task structures and submission validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_TITLE_LEN: usize = 3;
pub const MAX_TITLE_LEN: usize = 100;

/// Validation failures for a task submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task title must be at least 3 characters")]
    TitleTooShort,

    #[error("task title must be at most 100 characters")]
    TitleTooLong,

    #[error("task title must contain a letter or digit")]
    TitleNotAlphanumeric,

    #[error("estimated pomodoros must be at least 1")]
    ZeroEstimate,
}

/// A task tracked by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub estimated_pomodoros: u32,
    #[serde(default)]
    pub completed_pomodoros: u32,
}

impl Task {
    /// Record one finished focus session
    pub fn record_pomodoro(&mut self) {
        self.completed_pomodoros = self.completed_pomodoros.saturating_add(1);
    }
}

/// A task submission before the backend assigns an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default = "default_estimate")]
    pub estimated_pomodoros: u32,
}

fn default_estimate() -> u32 {
    1
}

impl NewTask {
    pub fn new(title: impl Into<String>, estimated_pomodoros: u32) -> Self {
        Self {
            title: title.into(),
            estimated_pomodoros,
        }
    }

    /// Validate the submission and return it with a trimmed title
    pub fn validate(self) -> Result<NewTask, TaskError> {
        let length = self.title.chars().count();
        if length < MIN_TITLE_LEN {
            return Err(TaskError::TitleTooShort);
        }
        if length > MAX_TITLE_LEN {
            return Err(TaskError::TitleTooLong);
        }

        let title = self.title.trim();
        if !title.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(TaskError::TitleNotAlphanumeric);
        }
        if self.estimated_pomodoros == 0 {
            return Err(TaskError::ZeroEstimate);
        }

        Ok(NewTask {
            title: title.to_string(),
            estimated_pomodoros: self.estimated_pomodoros,
        })
    }
}
