//! Session timer state machine
//!
//! Pure countdown logic: no clocks, no I/O. The controller calls `tick`
//! once per second while the timer is running and performs the side
//! effects described by the returned [`Completion`].

use serde::Serialize;

use super::{SessionType, TimerSettings, TimerState, TimerStatus};

/// Outcome of a finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub finished: SessionType,
    pub next: SessionType,
    /// Task credited with the pomodoro; only set when a focus session ends
    pub task_id: Option<String>,
    pub play_sound: bool,
    pub auto_started: bool,
}

/// Countdown with session-type sequencing
#[derive(Debug, Clone)]
pub struct SessionTimer {
    settings: TimerSettings,
    status: TimerStatus,
    remaining_seconds: u64,
    session_type: SessionType,
    current_session_index: u32,
    active_task_id: Option<String>,
}

impl SessionTimer {
    /// Create an idle timer at the start of a focus session
    pub fn new(settings: TimerSettings) -> Self {
        let remaining_seconds = settings.duration_secs(SessionType::Focus);
        Self {
            settings,
            status: TimerStatus::Idle,
            remaining_seconds,
            session_type: SessionType::Focus,
            current_session_index: 1,
            active_task_id: None,
        }
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn current_session_index(&self) -> u32 {
        self.current_session_index
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.active_task_id.as_deref()
    }

    pub fn snapshot(&self) -> TimerState {
        TimerState {
            status: self.status,
            is_running: self.is_running(),
            remaining_seconds: self.remaining_seconds,
            session_type: self.session_type,
            current_session_index: self.current_session_index,
            total_sessions: self.settings.total_sessions(),
            active_task_id: self.active_task_id.clone(),
        }
    }

    /// Start or resume the countdown. Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    /// Pause a running countdown, keeping the remaining time
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.status = TimerStatus::Paused;
        true
    }

    /// Stop and rewind to the full duration of the current session type
    pub fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.remaining_seconds = self.settings.duration_secs(self.session_type);
    }

    /// Advance the countdown by one second.
    ///
    /// Once the remaining time is already zero the next tick completes the
    /// session instead of decrementing.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.is_running() {
            return None;
        }
        match self.remaining_seconds.checked_sub(1) {
            Some(remaining) => {
                self.remaining_seconds = remaining;
                None
            }
            None => {
                self.remaining_seconds = 0;
                Some(self.complete())
            }
        }
    }

    /// Finish the current session and move to the next one
    pub fn complete(&mut self) -> Completion {
        self.status = TimerStatus::Idle;

        let finished = self.session_type;
        let task_id = match finished {
            SessionType::Focus => self.active_task_id.clone(),
            _ => None,
        };

        if finished == SessionType::Focus {
            if self.current_session_index >= self.settings.sessions_before_long_break {
                self.session_type = SessionType::LongBreak;
                self.current_session_index = 1;
            } else {
                self.session_type = SessionType::ShortBreak;
                self.current_session_index += 1;
            }
        } else {
            self.session_type = SessionType::Focus;
        }
        self.remaining_seconds = self.settings.duration_secs(self.session_type);

        let auto_started = self.settings.auto_start_next_session && self.start();

        Completion {
            finished,
            next: self.session_type,
            task_id,
            play_sound: self.settings.play_sound_when_session_ends,
            auto_started,
        }
    }

    /// Jump to another session type. Returns false when it is already current.
    pub fn switch_session_type(&mut self, session_type: SessionType) -> bool {
        if session_type == self.session_type {
            return false;
        }
        self.session_type = session_type;
        self.reset();
        true
    }

    /// Replace the settings wholesale; in-flight progress is discarded
    pub fn update_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
        if self.current_session_index > self.settings.total_sessions() {
            self.current_session_index = self.settings.total_sessions();
        }
        self.reset();
    }

    /// Attach a task and restart the cycle at its first focus session
    pub fn set_task(&mut self, task_id: impl Into<String>) {
        self.active_task_id = Some(task_id.into());
        self.session_type = SessionType::Focus;
        self.current_session_index = 1;
        self.reset();
    }
}
