//! Timer settings structure and validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SessionType;

pub const DEFAULT_FOCUS_MINUTES: u64 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;
pub const DEFAULT_SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

/// Errors returned when settings break their invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{0} duration must be greater than zero")]
    ZeroDuration(SessionType),

    #[error("sessions before long break must be at least 1")]
    ZeroSessions,
}

/// User-tunable timer settings, stored by the backend in camelCase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    /// Focus session length in minutes
    pub focus_duration: u64,
    /// Short break length in minutes
    pub short_break_duration: u64,
    /// Long break length in minutes
    pub long_break_duration: u64,
    /// Focus sessions in one cycle; the last is followed by a long break
    pub sessions_before_long_break: u32,
    pub auto_start_next_session: bool,
    pub play_sound_when_session_ends: bool,
}

impl TimerSettings {
    /// Length of a session type in minutes
    pub fn duration_minutes(&self, session_type: SessionType) -> u64 {
        match session_type {
            SessionType::Focus => self.focus_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Length of a session type in seconds
    pub fn duration_secs(&self, session_type: SessionType) -> u64 {
        self.duration_minutes(session_type).saturating_mul(60)
    }

    /// Number of focus sessions per cycle
    pub fn total_sessions(&self) -> u32 {
        self.sessions_before_long_break
    }

    /// Check the invariants: every duration > 0 and at least one session per cycle
    pub fn validate(&self) -> Result<(), SettingsError> {
        for session_type in SessionType::ALL {
            if self.duration_minutes(session_type) == 0 {
                return Err(SettingsError::ZeroDuration(session_type));
            }
        }
        if self.sessions_before_long_break == 0 {
            return Err(SettingsError::ZeroSessions);
        }
        Ok(())
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_duration: DEFAULT_FOCUS_MINUTES,
            short_break_duration: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_duration: DEFAULT_LONG_BREAK_MINUTES,
            sessions_before_long_break: DEFAULT_SESSIONS_BEFORE_LONG_BREAK,
            auto_start_next_session: false,
            play_sound_when_session_ends: true,
        }
    }
}
