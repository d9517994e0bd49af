//! Per-exercise countdown tasks

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{task::JoinHandle, time::interval};
use tracing::{debug, error, info};

use crate::state::{AppState, TimerPhase};

/// Running countdown tasks keyed by exercise id
///
/// At most one task exists per id: a restart aborts the previous task
/// before spawning its replacement.
#[derive(Debug, Default)]
pub struct CountdownRegistry {
    handles: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl CountdownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort any task for `id`, then spawn `task` in its place
    pub fn restart<F>(&self, id: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(mut handles) = self.handles.lock() else {
            error!("Failed to lock countdown registry, not starting {}", id);
            return;
        };
        if let Some(previous) = handles.remove(id) {
            previous.abort();
        }
        handles.insert(id.to_string(), tokio::spawn(task));
        debug!("Countdown task started for {}", id);
    }

    /// Abort the task for `id`, if any
    pub fn cancel(&self, id: &str) {
        if let Ok(mut handles) = self.handles.lock() {
            if let Some(handle) = handles.remove(id) {
                handle.abort();
                debug!("Countdown task cancelled for {}", id);
            }
        }
    }

    /// Abort every task
    pub fn abort_all(&self) {
        if let Ok(mut handles) = self.handles.lock() {
            for (_, handle) in handles.drain() {
                handle.abort();
            }
        }
    }

    /// Number of tasks still running
    pub fn active_count(&self) -> usize {
        self.handles
            .lock()
            .map(|handles| handles.values().filter(|handle| !handle.is_finished()).count())
            .unwrap_or(0)
    }
}

/// Tick one exercise timer every second until it completes or stops running
pub async fn countdown_task(state: Arc<AppState>, id: String) {
    info!("Starting countdown for {}", id);

    let mut interval = interval(Duration::from_secs(1));
    // The first tick fires immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        match state.tick_exercise_timer(&id) {
            Ok(TimerPhase::Running) => {}
            Ok(TimerPhase::Complete) => {
                info!("Countdown for {} complete", id);
                break;
            }
            Ok(TimerPhase::Paused) => {
                debug!("Countdown for {} no longer running", id);
                break;
            }
            Err(e) => {
                error!("Failed to tick timer for {}: {}", id, e);
                break;
            }
        }
    }
}
