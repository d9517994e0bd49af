//! Workout session controller
//!
//! Owns the routine and the session progress, applies every mutation and
//! writes the resulting snapshot to the store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::SessionState;
use crate::{
    catalog::Routine,
    error::{Result, WorkoutError},
    persistence::{SessionSnapshot, SnapshotStore},
};

/// What a completion request did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The exercise was already completed; nothing changed
    AlreadyCompleted,
    /// The exercise was recorded and `active` moved to its successor
    Advanced { active: Option<String> },
    /// The last outstanding exercise was recorded
    Finished,
}

/// Read-only view of the session for observers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub completed: Vec<String>,
    pub active: Option<String>,
    pub start_time: i64,
    pub paused_accumulated: i64,
    pub paused: bool,
    pub finished: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub progress: f64,
    pub remaining_minutes: f64,
}

pub struct WorkoutSession {
    routine: Arc<Routine>,
    state: SessionState,
    store: Box<dyn SnapshotStore>,
}

impl std::fmt::Debug for WorkoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutSession")
            .field("routine", &self.routine.title)
            .field("state", &self.state)
            .finish()
    }
}

impl WorkoutSession {
    /// Restore the session from the store, or start a fresh one at `now`.
    ///
    /// A malformed snapshot, or one that names exercises missing from the
    /// routine, is discarded and a fresh session begins.
    pub fn initialize(routine: Arc<Routine>, store: Box<dyn SnapshotStore>, now: i64) -> Result<Self> {
        let restored = match store.load() {
            Ok(Some(snapshot)) => match validate_snapshot(&routine, &snapshot, now) {
                Ok(()) => Some(SessionState::from_snapshot(snapshot)),
                Err(reason) => {
                    warn!("Discarding stale session snapshot: {}", reason);
                    None
                }
            },
            Ok(None) => None,
            Err(WorkoutError::Json(e)) => {
                warn!("Discarding malformed session snapshot: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        match restored {
            Some(state) => {
                info!(
                    "Restored session: {}/{} completed, active={:?}",
                    state.completed.len(),
                    routine.len(),
                    state.active
                );
                Ok(Self { routine, state, store })
            }
            None => {
                let state = SessionState::fresh(&routine, now);
                info!("Starting fresh session at {:?}", state.active);
                let session = Self { routine, state, store };
                session.persist()?;
                Ok(session)
            }
        }
    }

    pub fn shared_routine(&self) -> Arc<Routine> {
        Arc::clone(&self.routine)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Record an exercise as done and move `active` to the entry directly
    /// after it in routine order.
    ///
    /// The successor is positional: completing out of order can leave an
    /// earlier exercise outstanding while `active` points past it.
    pub fn complete_exercise(&mut self, id: &str) -> Result<CompletionOutcome> {
        if self.state.is_completed(id) {
            debug!("Exercise {} already completed", id);
            return Ok(CompletionOutcome::AlreadyCompleted);
        }
        if !self.routine.contains(id) {
            return Err(WorkoutError::UnknownExercise(id.to_string()));
        }

        self.state.completed.push(id.to_string());
        self.state.active = self.routine.successor(id).map(str::to_string);
        info!(
            "Completed {} ({}/{}), next: {:?}",
            id,
            self.state.completed.len(),
            self.routine.len(),
            self.state.active
        );

        if self.is_finished() {
            info!("Routine finished, clearing session snapshot");
            self.store.clear()?;
            return Ok(CompletionOutcome::Finished);
        }

        self.persist()?;
        Ok(CompletionOutcome::Advanced {
            active: self.state.active.clone(),
        })
    }

    /// Skip an exercise that offers a skip action; recorded like a completion
    pub fn skip_exercise(&mut self, id: &str) -> Result<CompletionOutcome> {
        let exercise = self
            .routine
            .get(id)
            .ok_or_else(|| WorkoutError::UnknownExercise(id.to_string()))?;
        if !exercise.skippable {
            return Err(WorkoutError::NotSkippable(id.to_string()));
        }

        info!("Skipping exercise {}", id);
        self.complete_exercise(id)
    }

    /// Pause a running session or resume a paused one. Returns whether the
    /// session is paused afterwards.
    pub fn toggle_pause(&mut self, now: i64) -> Result<bool> {
        match self.state.pause_started_at.take() {
            Some(pause_started_at) => {
                let paused_for = now.saturating_sub(pause_started_at).max(0);
                self.state.paused_accumulated =
                    self.state.paused_accumulated.saturating_add(paused_for);
                info!("Session resumed after {}ms pause", paused_for);
            }
            None => {
                self.state.pause_started_at = Some(now);
                info!("Session paused");
            }
        }

        self.persist()?;
        Ok(self.state.is_paused())
    }

    /// Start the routine over once `confirm` agrees. Returns whether the
    /// reset happened.
    pub fn reset<F>(&mut self, confirm: F, now: i64) -> Result<bool>
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            debug!("Reset declined");
            return Ok(false);
        }

        self.state = SessionState::fresh(&self.routine, now);
        info!("Session reset");
        self.persist()?;
        Ok(true)
    }

    /// Milliseconds of unpaused time since the session started
    pub fn elapsed_time(&self, now: i64) -> i64 {
        now.saturating_sub(self.state.start_time)
            .saturating_sub(self.state.paused_accumulated)
    }

    /// Elapsed time as shown to the user: frozen at the pause start while
    /// the session is paused
    pub fn displayed_elapsed(&self, now: i64) -> i64 {
        self.elapsed_time(self.state.pause_started_at.unwrap_or(now))
    }

    /// Estimated minutes left across all exercises not yet completed
    pub fn remaining_estimate_minutes(&self) -> f64 {
        self.routine
            .exercises
            .iter()
            .filter(|exercise| !self.state.is_completed(&exercise.id))
            .map(|exercise| exercise.time_minutes)
            .sum()
    }

    /// Fraction of the routine completed, in [0, 1]
    pub fn progress(&self) -> f64 {
        self.state.completed.len() as f64 / self.routine.len() as f64
    }

    pub fn is_finished(&self) -> bool {
        self.state.completed.len() == self.routine.len()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            completed: self.state.completed.clone(),
            active: self.state.active.clone(),
            start_time: self.state.start_time,
            paused_accumulated: self.state.paused_accumulated,
            paused: self.state.is_paused(),
            finished: self.is_finished(),
            completed_count: self.state.completed.len(),
            total_count: self.routine.len(),
            progress: self.progress(),
            remaining_minutes: self.remaining_estimate_minutes(),
        }
    }

    fn persist(&self) -> Result<()> {
        // A finished session keeps its snapshot cleared until reset
        if self.is_finished() {
            return Ok(());
        }
        self.store.save(&self.state.to_snapshot())
    }
}

/// Slack allowed between the saved clock values and the current clock
const CLOCK_SKEW_MS: i64 = 24 * 60 * 60 * 1000;

fn validate_snapshot(
    routine: &Routine,
    snapshot: &SessionSnapshot,
    now: i64,
) -> std::result::Result<(), String> {
    for (index, id) in snapshot.completed.iter().enumerate() {
        if !routine.contains(id) {
            return Err(format!("unknown completed exercise '{}'", id));
        }
        if snapshot.completed[..index].contains(id) {
            return Err(format!("exercise '{}' completed twice", id));
        }
    }
    if let Some(active) = &snapshot.active {
        if !routine.contains(active) {
            return Err(format!("unknown active exercise '{}'", active));
        }
    }
    if snapshot.paused_time < 0 {
        return Err(format!("negative paused time {}", snapshot.paused_time));
    }
    if snapshot.start_time < 0 || snapshot.start_time > now.saturating_add(CLOCK_SKEW_MS) {
        return Err(format!("start time {} out of range", snapshot.start_time));
    }
    let wall = now.saturating_sub(snapshot.start_time);
    if snapshot.paused_time > wall.saturating_add(CLOCK_SKEW_MS) {
        return Err(format!(
            "paused time {} exceeds time since start {}",
            snapshot.paused_time, wall
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::routine::tests::abc_routine, persistence::MemoryStore};

    const T0: i64 = 1_700_000_000_000;

    fn session_with(store: &MemoryStore) -> WorkoutSession {
        WorkoutSession::initialize(Arc::new(abc_routine()), Box::new(store.clone()), T0).unwrap()
    }

    fn stored(store: &MemoryStore) -> Option<SessionSnapshot> {
        store.load().unwrap()
    }

    #[test]
    fn fresh_initialize_activates_first_and_persists() {
        let store = MemoryStore::new();
        let session = session_with(&store);

        assert_eq!(session.state().active.as_deref(), Some("a"));
        assert_eq!(session.state().start_time, T0);
        assert_eq!(session.remaining_estimate_minutes(), 10.0);
        assert_eq!(stored(&store).unwrap().start_time, T0);
    }

    #[test]
    fn walkthrough_with_out_of_order_completion() {
        let store = MemoryStore::new();
        let mut session = session_with(&store);

        let outcome = session.complete_exercise("a").unwrap();
        assert_eq!(outcome, CompletionOutcome::Advanced { active: Some("b".to_string()) });
        assert_eq!(session.state().completed, vec!["a"]);
        assert_eq!(session.remaining_estimate_minutes(), 5.0);

        // Positional successor of the last entry is none, even with b outstanding
        let outcome = session.complete_exercise("c").unwrap();
        assert_eq!(outcome, CompletionOutcome::Advanced { active: None });
        assert_eq!(session.state().completed, vec!["a", "c"]);
        assert_eq!(session.state().active, None);
        assert_eq!(session.remaining_estimate_minutes(), 3.0);
    }

    #[test]
    fn completion_is_idempotent() {
        let store = MemoryStore::new();
        let mut session = session_with(&store);

        session.complete_exercise("a").unwrap();
        let before = session.state().clone();
        let outcome = session.complete_exercise("a").unwrap();

        assert_eq!(outcome, CompletionOutcome::AlreadyCompleted);
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn successor_follows_routine_position() {
        let routine = abc_routine();
        for (index, exercise) in routine.exercises.iter().enumerate() {
            let mut session = session_with(&MemoryStore::new());
            session.complete_exercise(&exercise.id).unwrap();
            let expected = routine.exercises.get(index + 1).map(|next| next.id.clone());
            assert_eq!(session.state().active, expected);
        }
    }

    #[test]
    fn finishing_clears_snapshot() {
        let store = MemoryStore::new();
        let mut session = session_with(&store);

        session.complete_exercise("a").unwrap();
        session.complete_exercise("b").unwrap();
        assert!(stored(&store).is_some());

        let outcome = session.complete_exercise("c").unwrap();
        assert_eq!(outcome, CompletionOutcome::Finished);
        assert!(session.is_finished());
        assert!(stored(&store).is_none());
        assert_eq!(session.progress(), 1.0);
        assert_eq!(session.remaining_estimate_minutes(), 0.0);

        // Pausing a finished session does not bring the snapshot back
        session.toggle_pause(T0 + 1000).unwrap();
        assert!(stored(&store).is_none());
    }

    #[test]
    fn remaining_time_never_increases() {
        let mut session = session_with(&MemoryStore::new());
        let mut last = session.remaining_estimate_minutes();
        for id in ["b", "a", "c"] {
            session.complete_exercise(id).unwrap();
            let remaining = session.remaining_estimate_minutes();
            assert!(remaining <= last);
            assert_eq!(remaining == 0.0, session.is_finished());
            last = remaining;
        }
    }

    #[test]
    fn unknown_exercise_is_rejected() {
        let store = MemoryStore::new();
        let mut session = session_with(&store);
        let before = session.state().clone();

        let err = session.complete_exercise("zzz").unwrap_err();
        assert!(matches!(err, WorkoutError::UnknownExercise(_)));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn skip_requires_skippable_exercise() {
        let mut routine = abc_routine();
        routine.exercises[1].skippable = true;
        let store = MemoryStore::new();
        let mut session =
            WorkoutSession::initialize(Arc::new(routine), Box::new(store.clone()), T0).unwrap();

        let err = session.skip_exercise("a").unwrap_err();
        assert!(matches!(err, WorkoutError::NotSkippable(_)));

        let outcome = session.skip_exercise("b").unwrap();
        assert_eq!(outcome, CompletionOutcome::Advanced { active: Some("c".to_string()) });
        assert!(session.state().is_completed("b"));
    }

    #[test]
    fn pause_intervals_accumulate() {
        let mut session = session_with(&MemoryStore::new());

        assert!(session.toggle_pause(T0 + 10_000).unwrap());
        assert!(!session.toggle_pause(T0 + 13_000).unwrap());
        assert!(session.toggle_pause(T0 + 20_000).unwrap());
        assert!(!session.toggle_pause(T0 + 25_500).unwrap());

        assert_eq!(session.state().paused_accumulated, 3_000 + 5_500);
        let now = T0 + 60_000;
        assert_eq!(session.elapsed_time(now), now - T0 - 8_500);
    }

    #[test]
    fn displayed_elapsed_freezes_while_paused() {
        let mut session = session_with(&MemoryStore::new());
        session.toggle_pause(T0 + 10_000).unwrap();

        assert_eq!(session.displayed_elapsed(T0 + 50_000), 10_000);
        session.toggle_pause(T0 + 50_000).unwrap();
        assert_eq!(session.displayed_elapsed(T0 + 51_000), 11_000);
    }

    #[test]
    fn pause_does_not_touch_progress() {
        let mut session = session_with(&MemoryStore::new());
        session.complete_exercise("a").unwrap();
        let completed = session.state().completed.clone();

        session.toggle_pause(T0 + 1).unwrap();
        assert_eq!(session.state().completed, completed);
        assert_eq!(session.state().active.as_deref(), Some("b"));
    }

    #[test]
    fn reset_respects_confirmation() {
        let store = MemoryStore::new();
        let mut session = session_with(&store);
        session.complete_exercise("a").unwrap();
        session.toggle_pause(T0 + 500).unwrap();
        let before = session.state().clone();

        assert!(!session.reset(|| false, T0 + 1000).unwrap());
        assert_eq!(session.state(), &before);

        assert!(session.reset(|| true, T0 + 2000).unwrap());
        assert!(session.state().completed.is_empty());
        assert_eq!(session.state().active.as_deref(), Some("a"));
        assert_eq!(session.state().start_time, T0 + 2000);
        assert_eq!(session.state().paused_accumulated, 0);
        assert!(!session.state().is_paused());
        assert_eq!(stored(&store).unwrap().start_time, T0 + 2000);
    }

    #[test]
    fn reset_after_finish_persists_again() {
        let store = MemoryStore::new();
        let mut session = session_with(&store);
        for id in ["a", "b", "c"] {
            session.complete_exercise(id).unwrap();
        }
        assert!(stored(&store).is_none());

        session.reset(|| true, T0 + 5000).unwrap();
        assert!(stored(&store).is_some());
    }

    #[test]
    fn restores_snapshot_verbatim() {
        let store = MemoryStore::new();
        let mut session = session_with(&store);
        session.complete_exercise("a").unwrap();
        session.toggle_pause(T0 + 1000).unwrap();
        session.toggle_pause(T0 + 4000).unwrap();

        let restored =
            WorkoutSession::initialize(Arc::new(abc_routine()), Box::new(store.clone()), T0 + 99_999)
                .unwrap();
        assert_eq!(restored.state().completed, session.state().completed);
        assert_eq!(restored.state().active, session.state().active);
        assert_eq!(restored.state().start_time, T0);
        assert_eq!(restored.state().paused_accumulated, 3000);
    }

    #[test]
    fn restores_literal_successor_state() {
        // b then a leaves the completed b marked active; restored as-is
        let store = MemoryStore::with_raw(
            r#"{"completed":["b","a"],"active":"b","startTime":5,"pausedTime":0}"#,
        );
        let session = session_with(&store);
        assert_eq!(session.state().active.as_deref(), Some("b"));
        assert_eq!(session.state().completed, vec!["b", "a"]);
    }

    #[test]
    fn malformed_snapshot_starts_fresh() {
        let store = MemoryStore::with_raw("not json at all");
        let session = session_with(&store);

        assert!(session.state().completed.is_empty());
        assert_eq!(session.state().start_time, T0);
        assert_eq!(stored(&store).unwrap().start_time, T0);
    }

    #[test]
    fn stale_snapshot_starts_fresh() {
        let store = MemoryStore::with_raw(
            r#"{"completed":["a","removed"],"active":"b","startTime":5,"pausedTime":0}"#,
        );
        let session = session_with(&store);
        assert!(session.state().completed.is_empty());
        assert_eq!(session.state().active.as_deref(), Some("a"));
    }

    fn assert_discarded(raw: &str) {
        let store = MemoryStore::with_raw(raw);
        let session = session_with(&store);
        assert!(session.state().completed.is_empty(), "restored {}", raw);
        assert_eq!(session.state().start_time, T0);
        assert_eq!(session.state().paused_accumulated, 0);
        assert_eq!(stored(&store).unwrap().start_time, T0);
    }

    #[test]
    fn invalid_snapshots_start_fresh() {
        assert_discarded(r#"{"completed":["a","a"],"active":"b","startTime":5,"pausedTime":0}"#);
        assert_discarded(r#"{"completed":["a"],"active":"gone","startTime":5,"pausedTime":0}"#);
        assert_discarded(r#"{"completed":["a"],"active":"b","startTime":5,"pausedTime":-1}"#);
    }

    #[test]
    fn out_of_range_clock_values_start_fresh() {
        assert_discarded(&format!(
            r#"{{"completed":["a"],"active":"b","startTime":{},"pausedTime":0}}"#,
            i64::MIN
        ));
        assert_discarded(&format!(
            r#"{{"completed":["a"],"active":"b","startTime":{},"pausedTime":0}}"#,
            i64::MAX
        ));
        assert_discarded(&format!(
            r#"{{"completed":["a"],"active":"b","startTime":5,"pausedTime":{}}}"#,
            i64::MAX
        ));
    }

    #[test]
    fn clock_arithmetic_saturates() {
        let mut session = session_with(&MemoryStore::new());
        session.state.paused_accumulated = i64::MAX - 10;

        session.toggle_pause(T0).unwrap();
        session.toggle_pause(T0 + 1_000).unwrap();
        assert_eq!(session.state().paused_accumulated, i64::MAX);

        session.state.start_time = i64::MIN;
        session.state.paused_accumulated = 0;
        assert_eq!(session.elapsed_time(T0), i64::MAX);
        assert_eq!(session.displayed_elapsed(T0), i64::MAX);
    }

    #[test]
    fn store_io_error_fails_initialize() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = crate::persistence::FileStore::new(dir.path());
        std::fs::create_dir(store.path()).unwrap();

        let err =
            WorkoutSession::initialize(Arc::new(abc_routine()), Box::new(store), T0).unwrap_err();
        assert!(matches!(err, WorkoutError::Io(_)));
    }

    #[test]
    fn view_reports_derived_values() {
        let mut session = session_with(&MemoryStore::new());
        session.complete_exercise("a").unwrap();

        let view = session.view();
        assert_eq!(view.completed_count, 1);
        assert_eq!(view.total_count, 3);
        assert!((view.progress - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(view.remaining_minutes, 5.0);
        assert!(!view.finished);
    }
}
