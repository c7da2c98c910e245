//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use super::{Completion, NewTask, SessionTimer, SessionType, Task, TaskError, TimerSettings, TimerState};
use crate::{
    services::Backend,
    utils::format::{format_clock, format_uptime},
};

/// Number of errors kept for clients
pub const MAX_ERRORS: usize = 20;

/// Failures of controller operations that the API reports to clients
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("{0}")]
    InvalidSettings(#[from] super::SettingsError),

    #[error("{0}")]
    InvalidTask(#[from] TaskError),

    #[error("task {0} not found")]
    UnknownTask(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("{0}")]
    Lock(String),
}

/// Main application state that owns the session timer and its surroundings
pub struct AppState {
    /// The countdown state machine
    pub timer: Arc<Mutex<SessionTimer>>,
    /// Tasks known locally, updated optimistically
    pub tasks: Arc<Mutex<Vec<Task>>>,
    /// Recent errors for client visibility
    pub errors: Arc<Mutex<Vec<String>>>,
    /// Remote store for settings and tasks
    pub backend: Arc<dyn Backend>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for timer updates; the ticker follows it
    pub timer_update_tx: watch::Sender<TimerState>,
    /// Channel for session completion notifications
    pub completion_tx: broadcast::Sender<Completion>,
}

impl AppState {
    /// Create a new AppState with an idle focus session
    pub fn new(port: u16, host: String, settings: TimerSettings, backend: Arc<dyn Backend>) -> Self {
        let timer = SessionTimer::new(settings);
        let (timer_update_tx, _) = watch::channel(timer.snapshot());
        let (completion_tx, _) = broadcast::channel(100);

        Self {
            timer: Arc::new(Mutex::new(timer)),
            tasks: Arc::new(Mutex::new(Vec::new())),
            errors: Arc::new(Mutex::new(Vec::new())),
            backend,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            timer_update_tx,
            completion_tx,
        }
    }

    /// Apply a change to the timer, publish the new snapshot and return it
    fn update_timer<F, R>(&self, action: &str, updater: F) -> Result<(TimerState, R), String>
    where
        F: FnOnce(&mut SessionTimer) -> R,
    {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        let result = updater(&mut *timer);
        let snapshot = timer.snapshot();
        // Publish under the lock so snapshots reach watchers in mutation order
        self.timer_update_tx.send_replace(snapshot.clone());
        drop(timer);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok((snapshot, result))
    }

    /// Subscribe to timer snapshots
    pub fn subscribe_timer(&self) -> watch::Receiver<TimerState> {
        self.timer_update_tx.subscribe()
    }

    /// Subscribe to session completions
    pub fn subscribe_completions(&self) -> broadcast::Receiver<Completion> {
        self.completion_tx.subscribe()
    }

    /// Start or resume the countdown
    pub fn start(&self) -> Result<TimerState, String> {
        let (state, started) = self.update_timer("start", |timer| timer.start())?;
        if started {
            info!("Timer started: {} {} remaining", state.session_type, format_clock(state.remaining_seconds));
        } else {
            debug!("Start ignored, timer already running");
        }
        Ok(state)
    }

    /// Pause the countdown
    pub fn pause(&self) -> Result<TimerState, String> {
        let (state, paused) = self.update_timer("pause", |timer| timer.pause())?;
        if paused {
            info!("Timer paused at {}", format_clock(state.remaining_seconds));
        } else {
            debug!("Pause ignored, timer not running");
        }
        Ok(state)
    }

    /// Stop and rewind the current session
    pub fn reset(&self) -> Result<TimerState, String> {
        let (state, ()) = self.update_timer("reset", |timer| timer.reset())?;
        info!("Timer reset to {} {}", state.session_type, format_clock(state.remaining_seconds));
        Ok(state)
    }

    /// Advance the countdown by one second; called by the ticker
    pub fn tick(&self) -> Result<TimerState, String> {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;
        let completion = timer.tick();
        let snapshot = timer.snapshot();
        self.timer_update_tx.send_replace(snapshot.clone());
        drop(timer);

        if let Some(completion) = completion {
            self.handle_completion(completion);
        }
        Ok(snapshot)
    }

    /// Finish the current session right away
    pub fn skip(&self) -> Result<TimerState, String> {
        let (state, completion) = self.update_timer("skip", |timer| timer.complete())?;
        self.handle_completion(completion);
        Ok(state)
    }

    /// Jump to a different session type
    pub fn switch_session_type(&self, session_type: SessionType) -> Result<TimerState, String> {
        let (state, switched) = self.update_timer("switch", |timer| timer.switch_session_type(session_type))?;
        if switched {
            info!("Switched to {} session", session_type);
        }
        Ok(state)
    }

    /// Replace the settings and reset the timer
    pub fn update_settings(&self, settings: TimerSettings) -> Result<TimerState, String> {
        let (state, ()) = self.update_timer("settings", |timer| timer.update_settings(settings))?;
        info!("Timer settings updated, {} sessions per cycle", state.total_sessions);
        Ok(state)
    }

    /// Attach a locally known task to the timer
    pub fn select_task(&self, task_id: &str) -> Result<TimerState, ControlError> {
        let known = self.tasks.lock()
            .map_err(|e| ControlError::Lock(format!("Failed to lock task list: {}", e)))?
            .iter()
            .any(|t| t.id == task_id);
        if !known {
            return Err(ControlError::UnknownTask(task_id.to_string()));
        }

        let (state, ()) = self
            .update_timer("select-task", |timer| timer.set_task(task_id))
            .map_err(ControlError::Lock)?;
        info!("Task {} selected for timer", task_id);
        Ok(state)
    }

    /// Current settings
    pub fn get_settings(&self) -> Result<TimerSettings, String> {
        self.timer.lock()
            .map(|timer| timer.settings().clone())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.timer.lock()
            .map(|timer| timer.snapshot())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Get the local task list
    pub fn get_tasks(&self) -> Result<Vec<Task>, String> {
        self.tasks.lock()
            .map(|tasks| tasks.clone())
            .map_err(|e| format!("Failed to lock task list: {}", e))
    }

    /// Load settings from the backend, keeping the current ones on failure
    pub async fn load_settings(&self) -> Result<TimerState, String> {
        match self.backend.fetch_settings().await {
            Ok(settings) => match settings.validate() {
                Ok(()) => {
                    self.clear_errors_for("settings")?;
                    self.update_settings(settings)
                }
                Err(e) => {
                    warn!("Backend returned invalid settings: {}", e);
                    self.add_error(format!("Loaded settings are invalid: {}", e))?;
                    self.get_timer_state()
                }
            },
            Err(e) => {
                warn!("Failed to load settings from {} backend: {}", self.backend.name(), e);
                self.add_error(format!("Failed to load settings: {}", e))?;
                self.get_timer_state()
            }
        }
    }

    /// Validate and apply new settings locally, then persist them.
    ///
    /// The local change stands even if persisting fails.
    pub async fn save_settings(&self, settings: TimerSettings) -> Result<TimerState, ControlError> {
        settings.validate()?;
        let state = self.update_settings(settings.clone()).map_err(ControlError::Lock)?;

        self.clear_errors_for("settings").map_err(ControlError::Lock)?;
        if let Err(e) = self.backend.save_settings(&settings).await {
            warn!("Failed to persist settings: {}", e);
            let message = format!("Failed to save settings: {}", e);
            self.add_error(message.clone()).map_err(ControlError::Lock)?;
            return Err(ControlError::Backend(message));
        }
        Ok(state)
    }

    /// Validate a submission, create it remotely and append it locally
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, ControlError> {
        let new_task = new_task.validate()?;
        let task = self.backend.create_task(&new_task).await.map_err(|e| {
            warn!("Failed to create task '{}': {}", new_task.title, e);
            ControlError::Backend(e.to_string())
        })?;

        self.tasks.lock()
            .map_err(|e| ControlError::Lock(format!("Failed to lock task list: {}", e)))?
            .push(task.clone());
        info!("Task {} created: {}", task.id, task.title);
        Ok(task)
    }

    /// Run the side effects of a finished session
    fn handle_completion(&self, completion: Completion) {
        info!(
            "{} session complete, next: {}{}",
            completion.finished,
            completion.next,
            if completion.auto_started { " (auto-started)" } else { "" }
        );

        if let Some(task_id) = completion.task_id.clone() {
            self.credit_task(&task_id);
        }

        if let Err(e) = self.completion_tx.send(completion) {
            debug!("No completion listeners: {}", e);
        }
    }

    /// Count a pomodoro locally and tell the backend without waiting for it
    fn credit_task(&self, task_id: &str) {
        match self.tasks.lock() {
            Ok(mut tasks) => {
                if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
                    task.record_pomodoro();
                }
            }
            Err(e) => error!("Failed to lock task list: {}", e),
        }

        let backend = Arc::clone(&self.backend);
        let errors = Arc::clone(&self.errors);
        let task_id = task_id.to_string();
        tokio::spawn(async move {
            let outcome = match backend.complete_pomodoro(&task_id).await {
                Ok(()) => clear_errors(&errors, "pomodoro"),
                Err(e) => {
                    warn!("Failed to record pomodoro for task {}: {}", task_id, e);
                    push_error(&errors, format!("Failed to record pomodoro for task {}: {}", task_id, e))
                }
            };
            if let Err(e) = outcome {
                error!("{}", e);
            }
        });
    }

    /// Add an error to the state
    pub fn add_error(&self, error: String) -> Result<(), String> {
        push_error(&self.errors, error)
    }

    /// Clear errors mentioning a specific component
    pub fn clear_errors_for(&self, component: &str) -> Result<(), String> {
        clear_errors(&self.errors, component)
    }

    /// Get recorded errors
    pub fn get_errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

/// Record an error, keeping only the most recent entries
fn push_error(errors: &Mutex<Vec<String>>, error: String) -> Result<(), String> {
    let mut errors = errors.lock()
        .map_err(|e| format!("Failed to lock error list: {}", e))?;

    warn!("Adding error to state: {}", error);
    errors.push(error);
    if errors.len() > MAX_ERRORS {
        let excess = errors.len() - MAX_ERRORS;
        errors.drain(..excess);
    }
    Ok(())
}

/// Drop errors whose message mentions `component`
fn clear_errors(errors: &Mutex<Vec<String>>, component: &str) -> Result<(), String> {
    let mut errors = errors.lock()
        .map_err(|e| format!("Failed to lock error list: {}", e))?;

    let initial_count = errors.len();
    let component = component.to_lowercase();
    errors.retain(|error| !error.to_lowercase().contains(&component));
    if errors.len() != initial_count {
        info!("Cleared {} errors for component: {}", initial_count - errors.len(), component);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryBackend;
    use crate::state::TimerStatus;
    use std::time::Duration;

    fn app(settings: TimerSettings) -> (AppState, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new(settings.clone()));
        let state = AppState::new(0, "127.0.0.1".to_string(), settings, backend.clone());
        (state, backend)
    }

    #[tokio::test]
    async fn operations_publish_snapshots() {
        let (state, _) = app(TimerSettings::default());
        let rx = state.subscribe_timer();

        state.start().unwrap();
        assert!(rx.borrow().is_running());

        state.pause().unwrap();
        assert_eq!(rx.borrow().status, TimerStatus::Paused);
        assert_eq!(state.get_last_action().0.as_deref(), Some("pause"));
    }

    #[tokio::test]
    async fn load_settings_replaces_local_settings() {
        let (state, backend) = app(TimerSettings::default());
        let remote = TimerSettings { focus_duration: 50, ..TimerSettings::default() };
        backend.save_settings(&remote).await.unwrap();

        let snapshot = state.load_settings().await.unwrap();
        assert_eq!(snapshot.remaining_seconds, 3000);
        assert_eq!(state.get_settings().unwrap(), remote);
    }

    #[tokio::test]
    async fn load_failure_keeps_settings_and_records_error() {
        let (state, backend) = app(TimerSettings::default());
        backend.set_offline(true);

        let snapshot = state.load_settings().await.unwrap();
        assert_eq!(snapshot.remaining_seconds, 1500);
        assert_eq!(state.get_errors().len(), 1);

        backend.set_offline(false);
        state.load_settings().await.unwrap();
        assert!(state.get_errors().is_empty());
    }

    #[tokio::test]
    async fn invalid_settings_are_rejected() {
        let (state, _) = app(TimerSettings::default());
        let bad = TimerSettings { focus_duration: 0, ..TimerSettings::default() };
        let result = state.save_settings(bad).await;
        assert!(matches!(result, Err(ControlError::InvalidSettings(_))));
        assert_eq!(state.get_settings().unwrap(), TimerSettings::default());
    }

    #[tokio::test]
    async fn saved_settings_apply_even_when_backend_fails() {
        let (state, backend) = app(TimerSettings::default());
        backend.set_offline(true);

        let settings = TimerSettings { short_break_duration: 10, ..TimerSettings::default() };
        let result = state.save_settings(settings.clone()).await;
        assert!(matches!(result, Err(ControlError::Backend(_))));
        assert_eq!(state.get_settings().unwrap(), settings);
    }

    #[tokio::test]
    async fn created_tasks_are_listed_and_selectable() {
        let (state, _) = app(TimerSettings::default());
        let task = state.create_task(NewTask::new("  write notes ", 2)).await.unwrap();
        assert_eq!(task.title, "write notes");
        assert_eq!(state.get_tasks().unwrap().len(), 1);

        let snapshot = state.select_task(&task.id).unwrap();
        assert_eq!(snapshot.active_task_id.as_deref(), Some(task.id.as_str()));

        assert!(matches!(state.select_task("nope"), Err(ControlError::UnknownTask(_))));
    }

    #[tokio::test]
    async fn invalid_task_never_reaches_backend() {
        let (state, backend) = app(TimerSettings::default());
        let result = state.create_task(NewTask::new("ab", 1)).await;
        assert!(matches!(result, Err(ControlError::InvalidTask(TaskError::TitleTooShort))));
        assert!(backend.tasks().is_empty());
    }

    #[tokio::test]
    async fn finished_focus_credits_task_locally_and_remotely() {
        let (state, backend) = app(TimerSettings::default());
        let mut completions = state.subscribe_completions();
        let task = state.create_task(NewTask::new("deep work", 4)).await.unwrap();
        state.select_task(&task.id).unwrap();

        let snapshot = state.skip().unwrap();
        assert_eq!(snapshot.session_type, SessionType::ShortBreak);
        assert_eq!(state.get_tasks().unwrap()[0].completed_pomodoros, 1);

        let completion = completions.recv().await.unwrap();
        assert_eq!(completion.task_id.as_deref(), Some(task.id.as_str()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.tasks()[0].completed_pomodoros, 1);
    }

    #[tokio::test]
    async fn backend_failure_on_completion_keeps_timer_going() {
        let (state, backend) = app(TimerSettings::default());
        let task = state.create_task(NewTask::new("deep work", 4)).await.unwrap();
        state.select_task(&task.id).unwrap();
        backend.set_offline(true);

        let snapshot = state.skip().unwrap();
        assert_eq!(snapshot.session_type, SessionType::ShortBreak);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(state.get_errors().len(), 1);
        assert_eq!(state.get_tasks().unwrap()[0].completed_pomodoros, 1);
    }

    #[test]
    fn racing_start_and_pause_publish_in_order() {
        for _ in 0..500 {
            let (state, _) = app(TimerSettings::default());
            let rx = state.subscribe_timer();

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    for _ in 0..20 {
                        state.pause().unwrap();
                    }
                });
                scope.spawn(|| {
                    for _ in 0..20 {
                        state.start().unwrap();
                    }
                });
            });

            assert_eq!(rx.borrow().status, state.get_timer_state().unwrap().status);
        }
    }

    #[tokio::test]
    async fn error_list_is_capped() {
        let (state, _) = app(TimerSettings::default());
        for i in 0..(MAX_ERRORS + 15) {
            state.add_error(format!("error {}", i)).unwrap();
        }

        let errors = state.get_errors();
        assert_eq!(errors.len(), MAX_ERRORS);
        assert_eq!(errors.last().map(String::as_str), Some("error 34"));
        assert_eq!(errors.first().map(String::as_str), Some("error 15"));
    }

    #[tokio::test]
    async fn pomodoro_errors_clear_once_backend_recovers() {
        let (state, backend) = app(TimerSettings::default());
        let task = state.create_task(NewTask::new("deep work", 4)).await.unwrap();
        state.select_task(&task.id).unwrap();

        backend.set_offline(true);
        for _ in 0..200 {
            state.skip().unwrap();
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(state.get_errors().len(), MAX_ERRORS);

        backend.set_offline(false);
        for _ in 0..4 {
            state.skip().unwrap();
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(state.get_errors().is_empty());
        assert_eq!(backend.tasks()[0].completed_pomodoros, 2);
    }
}
