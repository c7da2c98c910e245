//! In-process backend used when no backend URL is configured

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex,
};

use async_trait::async_trait;

use super::backend::{Backend, BackendError};
use crate::state::{NewTask, Task, TimerSettings};

/// Keeps settings and tasks in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryBackend {
    settings: Mutex<TimerSettings>,
    tasks: Mutex<Vec<Task>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryBackend {
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            ..Self::default()
        }
    }

    /// Make every call fail as if the network were down
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Tasks as the backend sees them
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn ensure_online(&self) -> Result<(), BackendError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Other("backend unreachable".to_string()));
        }
        Ok(())
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> BackendError {
    BackendError::Other(format!("Failed to lock backend store: {}", e))
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_settings(&self) -> Result<TimerSettings, BackendError> {
        self.ensure_online()?;
        Ok(self.settings.lock().map_err(poisoned)?.clone())
    }

    async fn save_settings(&self, settings: &TimerSettings) -> Result<(), BackendError> {
        self.ensure_online()?;
        *self.settings.lock().map_err(poisoned)? = settings.clone();
        Ok(())
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, BackendError> {
        self.ensure_online()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let task = Task {
            id: id.to_string(),
            title: task.title.clone(),
            estimated_pomodoros: task.estimated_pomodoros,
            completed_pomodoros: 0,
        };
        self.tasks.lock().map_err(poisoned)?.push(task.clone());
        Ok(task)
    }

    async fn complete_pomodoro(&self, task_id: &str) -> Result<(), BackendError> {
        self.ensure_online()?;
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| BackendError::NotFound(format!("task {}", task_id)))?;
        task.record_pomodoro();
        Ok(())
    }
}
