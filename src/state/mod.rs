//! State management module
//!
//! This module contains the session timer, its settings and tasks, and the
//! shared application state that owns them.

pub mod settings;
pub mod task;
pub mod timer_state;
pub mod session_timer;
pub mod app_state;

// Re-export main types
pub use settings::{SettingsError, TimerSettings};
pub use task::{NewTask, Task, TaskError};
pub use timer_state::{SessionType, TimerState, TimerStatus};
pub use session_timer::{Completion, SessionTimer};
pub use app_state::{AppState, ControlError};
