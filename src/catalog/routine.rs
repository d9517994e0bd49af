//! Exercise definitions and the ordered routine

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::DurationSpec;
use crate::error::{Result, WorkoutError};

const BUILTIN_ROUTINE: &str = include_str!("../../data/routine.json");

/// A single exercise as supplied by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    /// Free-text rep or duration description ("25 reps", "5 minutes")
    pub reps: String,
    /// Estimated minutes used for remaining-time estimation
    pub time_minutes: f64,
    #[serde(default)]
    pub skippable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Offset into the video, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_description: Option<String>,
}

impl Exercise {
    pub fn duration_spec(&self) -> DurationSpec {
        DurationSpec::parse(&self.reps)
    }

    /// Label for the completion action, e.g. "Complete 25 reps"
    pub fn complete_label(&self) -> String {
        if self.reps.contains("reps") {
            format!("Complete {}", self.reps)
        } else {
            "Complete".to_string()
        }
    }
}

/// The fixed, ordered list of exercises making up one workout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub title: String,
    pub exercises: Vec<Exercise>,
}

impl Routine {
    /// Build a routine, rejecting empty lists, duplicate ids and bad estimates
    pub fn new(title: impl Into<String>, exercises: Vec<Exercise>) -> Result<Self> {
        let routine = Self {
            title: title.into(),
            exercises,
        };
        routine.validate()?;
        Ok(routine)
    }

    /// The routine bundled with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_ROUTINE)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let routine: Routine = serde_json::from_str(json)?;
        routine.validate()?;
        Ok(routine)
    }

    /// Load a routine definition from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let routine = Self::from_json(&contents)?;
        info!(
            "Loaded routine '{}' with {} exercises from {}",
            routine.title,
            routine.len(),
            path.display()
        );
        Ok(routine)
    }

    fn validate(&self) -> Result<()> {
        if self.exercises.is_empty() {
            return Err(WorkoutError::InvalidRoutine(
                "routine must have at least one exercise".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for exercise in &self.exercises {
            if !seen.insert(exercise.id.as_str()) {
                return Err(WorkoutError::InvalidRoutine(format!(
                    "duplicate exercise id: {}",
                    exercise.id
                )));
            }
            if !exercise.time_minutes.is_finite() || exercise.time_minutes < 0.0 {
                return Err(WorkoutError::InvalidRoutine(format!(
                    "estimated minutes must be a nonnegative number: {}",
                    exercise.id
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|exercise| exercise.id.as_str())
    }

    pub fn first_id(&self) -> Option<&str> {
        self.exercises.first().map(|exercise| exercise.id.as_str())
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.exercises.iter().position(|exercise| exercise.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }

    /// The entry directly after `id` in routine order
    pub fn successor(&self, id: &str) -> Option<&str> {
        let index = self.position(id)?;
        self.exercises
            .get(index + 1)
            .map(|exercise| exercise.id.as_str())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn exercise(id: &str, reps: &str, minutes: f64) -> Exercise {
        Exercise {
            id: id.to_string(),
            title: id.to_uppercase(),
            reps: reps.to_string(),
            time_minutes: minutes,
            skippable: false,
            notes: None,
            video_id: None,
            start_time: None,
            thumbnail: None,
            video_title: None,
            video_description: None,
        }
    }

    /// The three-exercise routine a(5m), b(3m), c(2m)
    pub(crate) fn abc_routine() -> Routine {
        Routine::new(
            "Sample",
            vec![
                exercise("a", "5 minutes", 5.0),
                exercise("b", "10 reps", 3.0),
                exercise("c", "30 seconds", 2.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn builtin_routine_is_valid() {
        let routine = Routine::builtin().unwrap();
        assert!(!routine.is_empty());
        assert_eq!(routine.first_id(), Some("step1"));
        assert!(routine.get("step6").unwrap().skippable);
    }

    #[test]
    fn successor_is_positional() {
        let routine = abc_routine();
        assert_eq!(routine.successor("a"), Some("b"));
        assert_eq!(routine.successor("b"), Some("c"));
        assert_eq!(routine.successor("c"), None);
        assert_eq!(routine.successor("zzz"), None);
    }

    #[test]
    fn rejects_empty_routine() {
        let err = Routine::new("Empty", Vec::new()).unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidRoutine(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Routine::new(
            "Dupes",
            vec![exercise("a", "10 reps", 1.0), exercise("a", "10 reps", 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidRoutine(_)));
    }

    #[test]
    fn rejects_negative_estimate() {
        let err = Routine::new("Negative", vec![exercise("a", "10 reps", -1.0)]).unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidRoutine(_)));
    }

    #[test]
    fn parses_catalog_json() {
        let json = r#"{
            "title": "Mini",
            "exercises": [
                {"id": "x", "title": "X", "reps": "2 minutes", "timeMinutes": 2, "videoId": "abc"},
                {"id": "y", "title": "Y", "reps": "12 reps", "timeMinutes": 1.5, "skippable": true}
            ]
        }"#;
        let routine = Routine::from_json(json).unwrap();
        assert_eq!(routine.len(), 2);
        assert_eq!(routine.get("x").unwrap().video_id.as_deref(), Some("abc"));
        assert_eq!(routine.get("x").unwrap().duration_spec().countdown_seconds(), Some(120));
        assert!(routine.get("y").unwrap().skippable);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("routine.json");
        fs::write(&path, serde_json::to_string(&abc_routine()).unwrap()).unwrap();

        let routine = Routine::load(&path).unwrap();
        assert_eq!(routine, abc_routine());
    }

    #[test]
    fn complete_label_mentions_reps_only() {
        assert_eq!(exercise("a", "25 reps", 1.0).complete_label(), "Complete 25 reps");
        assert_eq!(exercise("a", "5 minutes", 1.0).complete_label(), "Complete");
    }
}
