//! Timer state structure and session types

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kind of session the countdown is measuring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub const ALL: [SessionType; 3] = [
        SessionType::Focus,
        SessionType::ShortBreak,
        SessionType::LongBreak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Focus)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    /// Accepts the wire names plus their snake_case and kebab-case spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(SessionType::Focus),
            "shortBreak" | "short_break" | "short-break" => Ok(SessionType::ShortBreak),
            "longBreak" | "long_break" | "long-break" => Ok(SessionType::LongBreak),
            other => Err(format!("Unknown session type: {}", other)),
        }
    }
}

/// Countdown status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Snapshot of the session timer, published on every change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    /// Mirrors `status == Running` for clients that only need the flag
    pub is_running: bool,
    pub remaining_seconds: u64,
    pub session_type: SessionType,
    /// 1-based position of the current focus session in the cycle
    pub current_session_index: u32,
    pub total_sessions: u32,
    pub active_task_id: Option<String>,
}

impl TimerState {
    /// Check if the countdown is ticking
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_type_spellings() {
        assert_eq!("focus".parse::<SessionType>(), Ok(SessionType::Focus));
        assert_eq!("shortBreak".parse::<SessionType>(), Ok(SessionType::ShortBreak));
        assert_eq!("long-break".parse::<SessionType>(), Ok(SessionType::LongBreak));
        assert!("nap".parse::<SessionType>().is_err());
    }

    #[test]
    fn breaks_are_breaks() {
        assert!(!SessionType::Focus.is_break());
        assert!(SessionType::ShortBreak.is_break());
        assert!(SessionType::LongBreak.is_break());
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let state = TimerState {
            status: TimerStatus::Running,
            is_running: true,
            remaining_seconds: 90,
            session_type: SessionType::ShortBreak,
            current_session_index: 2,
            total_sessions: 4,
            active_task_id: Some("7".to_string()),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["isRunning"], true);
        assert_eq!(json["remainingSeconds"], 90);
        assert_eq!(json["sessionType"], "shortBreak");
        assert_eq!(json["currentSessionIndex"], 2);
        assert_eq!(json["activeTaskId"], "7");
    }
}
