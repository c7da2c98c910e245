//! Configuration and CLI argument handling

use clap::Parser;

use crate::state::{
    settings::{
        DEFAULT_FOCUS_MINUTES, DEFAULT_LONG_BREAK_MINUTES, DEFAULT_SESSIONS_BEFORE_LONG_BREAK,
        DEFAULT_SHORT_BREAK_MINUTES,
    },
    TimerSettings,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "tomato-timer")]
#[command(about = "A Pomodoro session timer service backed by a REST task backend")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Base URL of the settings/task backend; tasks stay in memory when unset
    #[arg(short, long)]
    pub backend_url: Option<String>,

    /// Focus session length in minutes, used until settings load from the backend
    #[arg(long, default_value_t = DEFAULT_FOCUS_MINUTES, value_parser = clap::value_parser!(u64).range(1..))]
    pub focus: u64,

    /// Short break length in minutes
    #[arg(long, default_value_t = DEFAULT_SHORT_BREAK_MINUTES, value_parser = clap::value_parser!(u64).range(1..))]
    pub short_break: u64,

    /// Long break length in minutes
    #[arg(long, default_value_t = DEFAULT_LONG_BREAK_MINUTES, value_parser = clap::value_parser!(u64).range(1..))]
    pub long_break: u64,

    /// Focus sessions before a long break
    #[arg(long, default_value_t = DEFAULT_SESSIONS_BEFORE_LONG_BREAK, value_parser = clap::value_parser!(u32).range(1..))]
    pub sessions_before_long_break: u32,

    /// Start the next session automatically when one ends
    #[arg(long)]
    pub auto_start: bool,

    /// Do not ring the terminal bell when a session ends
    #[arg(long)]
    pub no_sound: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Settings built from the command line flags
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            focus_duration: self.focus,
            short_break_duration: self.short_break,
            long_break_duration: self.long_break,
            sessions_before_long_break: self.sessions_before_long_break,
            auto_start_next_session: self.auto_start,
            play_sound_when_session_ends: !self.no_sound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_pomodoro() {
        let config = Config::try_parse_from(["tomato-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.timer_settings(), TimerSettings::default());
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn flags_override_settings() {
        let config = Config::try_parse_from([
            "tomato-timer",
            "--focus",
            "50",
            "--sessions-before-long-break",
            "2",
            "--auto-start",
            "--no-sound",
            "-v",
        ])
        .unwrap();
        let settings = config.timer_settings();
        assert_eq!(settings.focus_duration, 50);
        assert_eq!(settings.sessions_before_long_break, 2);
        assert!(settings.auto_start_next_session);
        assert!(!settings.play_sound_when_session_ends);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn zero_duration_flag_is_rejected() {
        assert!(Config::try_parse_from(["tomato-timer", "--focus", "0"]).is_err());
    }
}
