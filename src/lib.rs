//! Tomato Timer - A Pomodoro session timer service
//!
//! This library provides the session timer state machine, the shared state
//! that drives it once per second, a client for the settings/task backend
//! and the HTTP API that exposes the timer.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, SessionTimer, TimerSettings};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
