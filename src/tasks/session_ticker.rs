//! Session ticker background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that ticks the session timer once per second while it runs.
///
/// There is one ticker per process, so repeated starts never stack a second
/// tick stream.
pub async fn session_ticker_task(state: Arc<AppState>) {
    info!("Starting session ticker task");

    let mut timer_rx = state.subscribe_timer();

    loop {
        // Wait until the timer is running
        if timer_rx.wait_for(|timer| timer.is_running()).await.is_err() {
            debug!("Timer channel closed, stopping session ticker");
            return;
        }

        debug!("Timer running, starting tick stream");
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = state.tick() {
                        error!("Failed to tick timer: {}", e);
                    }
                }

                // State change - stop the stream once the timer is no longer running
                changed = timer_rx.changed() => {
                    if changed.is_err() {
                        debug!("Timer channel closed, stopping session ticker");
                        return;
                    }
                    if !timer_rx.borrow_and_update().is_running() {
                        debug!("Timer stopped, ending tick stream");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryBackend;
    use crate::state::{SessionType, TimerSettings, TimerStatus};

    fn spawn_app(settings: TimerSettings) -> Arc<AppState> {
        let backend = Arc::new(MemoryBackend::new(settings.clone()));
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), settings, backend));
        tokio::spawn(session_ticker_task(Arc::clone(&state)));
        state
    }

    fn one_minute_sessions() -> TimerSettings {
        TimerSettings {
            focus_duration: 1,
            short_break_duration: 1,
            long_break_duration: 2,
            sessions_before_long_break: 2,
            auto_start_next_session: false,
            play_sound_when_session_ends: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let state = spawn_app(TimerSettings::default());
        state.start().unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(state.get_timer_state().unwrap().remaining_seconds, 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_one_tick_stream() {
        let state = spawn_app(TimerSettings::default());
        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        state.start().unwrap();

        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(state.get_timer_state().unwrap().remaining_seconds, 1496);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticking() {
        let state = spawn_app(TimerSettings::default());
        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        state.pause().unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let timer = state.get_timer_state().unwrap();
        assert_eq!(timer.status, TimerStatus::Paused);
        assert_eq!(timer.remaining_seconds, 1498);

        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(state.get_timer_state().unwrap().remaining_seconds, 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_ticking() {
        let state = spawn_app(TimerSettings::default());
        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(5500)).await;
        state.reset().unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let timer = state.get_timer_state().unwrap();
        assert_eq!(timer.status, TimerStatus::Idle);
        assert_eq!(timer.remaining_seconds, 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn session_completes_and_waits() {
        let state = spawn_app(one_minute_sessions());
        state.start().unwrap();

        // 60 ticks to reach zero, one more to complete
        tokio::time::sleep(Duration::from_millis(61_500)).await;
        let timer = state.get_timer_state().unwrap();
        assert_eq!(timer.session_type, SessionType::ShortBreak);
        assert_eq!(timer.status, TimerStatus::Idle);
        assert_eq!(timer.remaining_seconds, 60);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(state.get_timer_state().unwrap().remaining_seconds, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_start_rolls_into_next_session() {
        let state = spawn_app(TimerSettings {
            auto_start_next_session: true,
            ..one_minute_sessions()
        });
        state.start().unwrap();

        tokio::time::sleep(Duration::from_millis(61_500)).await;
        let timer = state.get_timer_state().unwrap();
        assert_eq!(timer.session_type, SessionType::ShortBreak);
        assert!(timer.is_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(state.get_timer_state().unwrap().remaining_seconds, 50);
    }
}
