//! Main application state management

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{CompletionOutcome, ExerciseTimer, SessionView, TimerPhase, WorkoutSession};
use crate::{
    catalog::Routine,
    error::{Result, WorkoutError},
    tasks::{countdown_task, CountdownRegistry},
    utils::format::{format_elapsed, format_uptime},
};

/// Latest elapsed workout time published by the ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElapsedState {
    pub elapsed_ms: i64,
    pub display: String,
}

/// A change to one exercise timer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerUpdate {
    pub exercise_id: String,
    pub timer: ExerciseTimer,
}

/// Current wall-clock time in epoch millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Shared application state: the session controller, exercise timers and
/// the channels observers subscribe to
#[derive(Debug)]
pub struct AppState {
    pub routine: Arc<Routine>,
    /// Session controller; the only writer of session progress
    pub session: Arc<Mutex<WorkoutSession>>,
    /// Countdown timers for timed exercises
    pub timers: Arc<Mutex<HashMap<String, ExerciseTimer>>>,
    pub countdowns: CountdownRegistry,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Session change notifications
    pub state_change_tx: broadcast::Sender<SessionView>,
    /// Exercise timer change notifications
    pub timer_update_tx: broadcast::Sender<TimerUpdate>,
    /// Elapsed time published by the ticker
    pub elapsed_tx: watch::Sender<ElapsedState>,
    /// Keep the receiver alive to prevent channel closure
    pub _elapsed_rx: watch::Receiver<ElapsedState>,
}

impl AppState {
    pub fn new(session: WorkoutSession, port: u16, host: String) -> Self {
        let (state_change_tx, _) = broadcast::channel(100);
        let (timer_update_tx, _) = broadcast::channel(100);
        let routine = session.shared_routine();
        let elapsed = session.elapsed_time(now_millis());
        let (elapsed_tx, elapsed_rx) = watch::channel(ElapsedState {
            elapsed_ms: elapsed,
            display: format_elapsed(elapsed),
        });

        Self {
            timers: Arc::new(Mutex::new(build_timers(&routine))),
            routine,
            session: Arc::new(Mutex::new(session)),
            countdowns: CountdownRegistry::new(),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            state_change_tx,
            timer_update_tx,
            elapsed_tx,
            _elapsed_rx: elapsed_rx,
        }
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, WorkoutSession>> {
        self.session
            .lock()
            .map_err(|e| WorkoutError::Lock(format!("Failed to lock session: {}", e)))
    }

    fn lock_timers(&self) -> Result<MutexGuard<'_, HashMap<String, ExerciseTimer>>> {
        self.timers
            .lock()
            .map_err(|e| WorkoutError::Lock(format!("Failed to lock timers: {}", e)))
    }

    /// Apply a session mutation, then record the action and notify listeners
    pub fn update_session<F, R>(&self, action: &str, updater: F) -> Result<(R, SessionView)>
    where
        F: FnOnce(&mut WorkoutSession, i64) -> Result<R>,
    {
        let mut session = self.lock_session()?;
        let result = updater(&mut *session, now_millis())?;
        let view = session.view();
        drop(session); // Release the lock early

        self.record_action(action);
        self.notify_session(view.clone());
        Ok((result, view))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn notify_session(&self, view: SessionView) {
        // Sending fails only when nobody is subscribed
        if let Err(e) = self.state_change_tx.send(view) {
            debug!("No listeners for session change: {}", e);
        }
    }

    fn notify_timer(&self, exercise_id: &str, timer: &ExerciseTimer) {
        let update = TimerUpdate {
            exercise_id: exercise_id.to_string(),
            timer: timer.clone(),
        };
        if let Err(e) = self.timer_update_tx.send(update) {
            debug!("No listeners for timer update: {}", e);
        }
    }

    /// Mark an exercise complete
    pub fn complete_exercise(&self, id: &str) -> Result<(CompletionOutcome, SessionView)> {
        self.update_session(&format!("complete:{}", id), |session, _| {
            session.complete_exercise(id)
        })
    }

    /// Skip an exercise that allows skipping
    pub fn skip_exercise(&self, id: &str) -> Result<(CompletionOutcome, SessionView)> {
        self.update_session(&format!("skip:{}", id), |session, _| {
            session.skip_exercise(id)
        })
    }

    /// Pause or resume the session
    pub fn toggle_pause(&self) -> Result<SessionView> {
        let (paused, view) = self.update_session("toggle-pause", |session, now| {
            session.toggle_pause(now)
        })?;
        info!("Session {}", if paused { "paused" } else { "resumed" });
        Ok(view)
    }

    /// Reset the session if `confirmed`. Returns the new view, or `None` when
    /// the reset was declined and nothing changed.
    pub fn reset(&self, confirmed: bool) -> Result<Option<SessionView>> {
        let mut session = self.lock_session()?;
        if !session.reset(|| confirmed, now_millis())? {
            info!("Reset declined, session unchanged");
            return Ok(None);
        }
        let view = session.view();
        drop(session);

        {
            let mut timers = self.lock_timers()?;
            self.countdowns.abort_all();
            *timers = build_timers(&self.routine);
            for (id, timer) in timers.iter() {
                self.notify_timer(id, timer);
            }
        }

        self.record_action("reset");
        self.notify_session(view.clone());
        self.publish_elapsed()?;
        Ok(Some(view))
    }

    /// Read the session under its lock
    pub fn with_session<F, R>(&self, reader: F) -> Result<R>
    where
        F: FnOnce(&WorkoutSession) -> R,
    {
        Ok(reader(&*self.lock_session()?))
    }

    /// Get the current session view
    pub fn get_session_view(&self) -> Result<SessionView> {
        Ok(self.lock_session()?.view())
    }

    /// Elapsed unpaused workout time in millis, frozen while paused
    pub fn elapsed_ms(&self) -> Result<i64> {
        Ok(self.lock_session()?.displayed_elapsed(now_millis()))
    }

    /// Compute elapsed time and publish it to watchers
    pub fn publish_elapsed(&self) -> Result<ElapsedState> {
        let elapsed_ms = self.elapsed_ms()?;
        let elapsed = ElapsedState {
            elapsed_ms,
            display: format_elapsed(elapsed_ms),
        };
        if let Err(e) = self.elapsed_tx.send(elapsed.clone()) {
            warn!("Failed to send elapsed update: {}", e);
        }
        Ok(elapsed)
    }

    fn with_timer<F, R>(&self, id: &str, f: F) -> Result<(R, ExerciseTimer)>
    where
        F: FnOnce(&mut ExerciseTimer) -> R,
    {
        let mut timers = self.lock_timers()?;
        let Some(timer) = timers.get_mut(id) else {
            return Err(if self.routine.contains(id) {
                WorkoutError::NoCountdown(id.to_string())
            } else {
                WorkoutError::UnknownExercise(id.to_string())
            });
        };
        let result = f(timer);
        Ok((result, timer.clone()))
    }

    /// Get the countdown timer of one exercise
    pub fn get_timer(&self, id: &str) -> Result<ExerciseTimer> {
        self.with_timer(id, |_| ()).map(|(_, timer)| timer)
    }

    /// Get all countdown timers keyed by exercise id
    pub fn get_timers(&self) -> Result<HashMap<String, ExerciseTimer>> {
        Ok(self.lock_timers()?.clone())
    }

    /// Start an exercise countdown and its tick task. Starting a timer that
    /// is running or complete changes nothing.
    pub fn start_exercise_timer(self: &Arc<Self>, id: &str) -> Result<ExerciseTimer> {
        // The task registry changes under the timers lock, in step with the phase
        let (started, timer) = self.with_timer(id, |timer| {
            let started = timer.start();
            if started {
                self.countdowns
                    .restart(id, countdown_task(Arc::clone(self), id.to_string()));
            }
            started
        })?;
        if started {
            info!("Timer started for {} ({}s left)", id, timer.remaining_seconds);
        }
        self.record_action(&format!("timer-start:{}", id));
        self.notify_timer(id, &timer);
        Ok(timer)
    }

    /// Pause an exercise countdown and cancel its tick task
    pub fn pause_exercise_timer(&self, id: &str) -> Result<ExerciseTimer> {
        let (paused, timer) = self.with_timer(id, |timer| {
            let paused = timer.pause();
            self.countdowns.cancel(id);
            paused
        })?;
        if paused {
            info!("Timer paused for {} ({}s left)", id, timer.remaining_seconds);
        }
        self.record_action(&format!("timer-pause:{}", id));
        self.notify_timer(id, &timer);
        Ok(timer)
    }

    /// Advance an exercise countdown by one second
    pub fn tick_exercise_timer(&self, id: &str) -> Result<TimerPhase> {
        let (phase, timer) = self.with_timer(id, ExerciseTimer::tick)?;
        self.notify_timer(id, &timer);
        Ok(phase)
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

    /// Cancel all countdown tasks
    pub fn shutdown(&self) {
        info!("Stopping {} countdown tasks", self.countdowns.active_count());
        self.countdowns.abort_all();
    }
}

fn build_timers(routine: &Routine) -> HashMap<String, ExerciseTimer> {
    routine
        .exercises
        .iter()
        .filter_map(|exercise| {
            ExerciseTimer::for_exercise(exercise).map(|timer| (exercise.id.clone(), timer))
        })
        .collect()
}
