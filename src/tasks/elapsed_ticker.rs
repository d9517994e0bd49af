//! Elapsed workout time background task

use std::{sync::Arc, time::Duration};
use tokio::{sync::broadcast::error::RecvError, time::interval};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, SessionView};

/// Background task that publishes elapsed workout time once per second
/// while the session is running.
///
/// A pause stops the tick loop; resume or reset starts a new one.
pub async fn elapsed_ticker_task(state: Arc<AppState>) {
    info!("Starting elapsed time ticker");

    let mut state_rx = state.state_change_tx.subscribe();
    let mut current = match state.get_session_view() {
        Ok(view) => view,
        Err(e) => {
            error!("Failed to read session for elapsed ticker: {}", e);
            return;
        }
    };

    loop {
        if current.paused {
            debug!("Session paused, elapsed ticker idle");
            match next_view(&mut state_rx).await {
                Some(view) => current = view,
                None => break,
            }
            continue;
        }

        debug!("Session running, elapsed ticker active");
        let mut ticker = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = state.publish_elapsed() {
                        error!("Failed to publish elapsed time: {}", e);
                    }
                }

                view = next_view(&mut state_rx) => {
                    let Some(view) = view else {
                        info!("State channel closed, stopping elapsed ticker");
                        return;
                    };
                    let restart = view.paused != current.paused
                        || view.start_time != current.start_time
                        || view.paused_accumulated != current.paused_accumulated;
                    current = view;
                    if restart {
                        break;
                    }
                }
            }
        }
    }

    info!("State channel closed, stopping elapsed ticker");
}

async fn next_view(rx: &mut tokio::sync::broadcast::Receiver<SessionView>) -> Option<SessionView> {
    loop {
        match rx.recv().await {
            Ok(view) => return Some(view),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Elapsed ticker skipped {} state changes", skipped);
            }
            Err(RecvError::Closed) => return None,
        }
    }
}
