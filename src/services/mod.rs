//! External backend module
//!
//! This module contains the backend contract used by the timer and its
//! HTTP and in-memory implementations.

pub mod backend;
pub mod http;
pub mod memory;

// Re-export main types
pub use backend::{Backend, BackendError};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
