//! Session completion notifier background task

use std::{
    io::{self, Write},
    sync::Arc,
};
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{info, warn};

use crate::state::{AppState, Completion};

const BELL: &[u8] = b"\x07";

/// Background task that announces finished sessions
pub async fn session_notifier_task(state: Arc<AppState>) {
    info!("Starting session notifier task");

    let completion_rx = state.subscribe_completions();
    let announced = notify_completions(completion_rx, &mut io::stdout()).await;
    info!("Session notifier stopped after {} completions", announced);
}

/// Announce completions until the channel closes, returning how many were handled
pub async fn notify_completions<W: Write + Send>(mut completion_rx: Receiver<Completion>, out: &mut W) -> u64 {
    let mut announced = 0;

    loop {
        match completion_rx.recv().await {
            Ok(completion) => {
                announce(&completion, out);
                announced += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Session notifier lagged, {} completions skipped", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Completion channel closed, stopping session notifier");
                return announced;
            }
        }
    }
}

/// Log one completion and ring the bell on `out` when sound is enabled
pub fn announce<W: Write>(completion: &Completion, out: &mut W) {
    match &completion.task_id {
        Some(task_id) => info!("Pomodoro finished for task {}, time for a {}", task_id, completion.next),
        None => info!("{} over, next up: {}", completion.finished, completion.next),
    }

    if completion.play_sound {
        if let Err(e) = out.write_all(BELL).and_then(|_| out.flush()) {
            warn!("Failed to ring terminal bell: {}", e);
        }
    }
}
