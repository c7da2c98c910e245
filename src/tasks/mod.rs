//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod session_notifier;
pub mod session_ticker;

// Re-export main functions
pub use session_notifier::session_notifier_task;
pub use session_ticker::session_ticker_task;
