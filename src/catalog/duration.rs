//! Duration specification parsing for exercise rep/time descriptions

use serde::Serialize;

/// How an exercise is measured, derived from its free-text rep description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "lowercase")]
pub enum DurationSpec {
    /// Rep count or any other text without a timed unit
    Reps,
    Seconds(u32),
    Minutes(u32),
}

impl DurationSpec {
    /// Parse a description such as "5 minutes", "30 seconds each side" or "25 reps".
    ///
    /// The leading integer is the amount. Minutes win over seconds when a
    /// description mentions both.
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        let Some(amount) = leading_integer(&lower) else {
            return DurationSpec::Reps;
        };

        if lower.contains("minute") {
            DurationSpec::Minutes(amount)
        } else if lower.contains("second") {
            DurationSpec::Seconds(amount)
        } else {
            DurationSpec::Reps
        }
    }

    /// Countdown length in seconds, if this spec is timed
    pub fn countdown_seconds(&self) -> Option<u32> {
        match self {
            DurationSpec::Reps => None,
            DurationSpec::Seconds(seconds) => Some(*seconds),
            DurationSpec::Minutes(minutes) => Some(minutes.saturating_mul(60)),
        }
    }

    pub fn is_timed(&self) -> bool {
        self.countdown_seconds().is_some()
    }
}

fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes() {
        assert_eq!(DurationSpec::parse("5 minutes"), DurationSpec::Minutes(5));
        assert_eq!(DurationSpec::parse("1 minute"), DurationSpec::Minutes(1));
        assert_eq!(DurationSpec::parse("5 minutes").countdown_seconds(), Some(300));
    }

    #[test]
    fn parses_seconds_with_trailing_text() {
        let spec = DurationSpec::parse("30 seconds each side");
        assert_eq!(spec, DurationSpec::Seconds(30));
        assert_eq!(spec.countdown_seconds(), Some(30));
    }

    #[test]
    fn reps_have_no_countdown() {
        let spec = DurationSpec::parse("25 reps each side");
        assert_eq!(spec, DurationSpec::Reps);
        assert!(!spec.is_timed());
    }

    #[test]
    fn timed_text_without_amount_is_reps() {
        assert_eq!(DurationSpec::parse("a few minutes"), DurationSpec::Reps);
        assert_eq!(DurationSpec::parse(""), DurationSpec::Reps);
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(DurationSpec::parse("  2 Minutes"), DurationSpec::Minutes(2));
    }
}
