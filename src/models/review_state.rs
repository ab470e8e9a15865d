//! Per (user, card) scheduling state.
use crate::error::{Result, SchedulerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub times_studied: i32,
    pub times_correct: i32,
    pub times_incorrect: i32,
    pub consecutive_incorrect: i32,
    pub mastery_level: i32,
    pub last_studied_at: Option<DateTime<Utc>>,
    pub next_review_at: Option<DateTime<Utc>>,
}

/// State of a card that has never been studied. Also used as the
/// placeholder handed out for unstudied cards in a session.
impl Default for ReviewState {
    fn default() -> Self {
        Self {
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            times_studied: 0,
            times_correct: 0,
            times_incorrect: 0,
            consecutive_incorrect: 0,
            mastery_level: 0,
            last_studied_at: None,
            next_review_at: None,
        }
    }
}

impl ReviewState {
    /// A card with no `next_review_at` has never been scheduled and counts as due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.is_none_or(|at| at <= now)
    }

    pub fn is_mastered(&self) -> bool {
        self.mastery_level >= 80
    }

    /// Checks the stored invariants, reporting the first violation found.
    pub fn validate(&self) -> Result<()> {
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            return Err(SchedulerError::InvalidState(format!(
                "ease factor {} below {}",
                self.ease_factor, MIN_EASE_FACTOR
            )));
        }
        let counters = [
            ("interval", self.interval_days),
            ("repetitions", self.repetitions),
            ("times studied", self.times_studied),
            ("times correct", self.times_correct),
            ("times incorrect", self.times_incorrect),
            ("consecutive incorrect", self.consecutive_incorrect),
        ];
        if let Some((name, value)) = counters.iter().find(|(_, value)| *value < 0) {
            return Err(SchedulerError::InvalidState(format!(
                "{name} is negative ({value})"
            )));
        }
        if self.times_studied != self.times_correct + self.times_incorrect {
            return Err(SchedulerError::InvalidState(format!(
                "times studied {} != correct {} + incorrect {}",
                self.times_studied, self.times_correct, self.times_incorrect
            )));
        }
        if !(0..=100).contains(&self.mastery_level) {
            return Err(SchedulerError::InvalidState(format!(
                "mastery level {} outside 0..=100",
                self.mastery_level
            )));
        }
        Ok(())
    }

    /// Clamps every field back into its valid range.
    pub fn sanitize(&mut self) {
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            self.ease_factor = if self.ease_factor.is_nan() {
                INITIAL_EASE_FACTOR
            } else {
                self.ease_factor.clamp(MIN_EASE_FACTOR, f64::MAX)
            };
        }
        self.interval_days = self.interval_days.max(0);
        self.repetitions = self.repetitions.max(0);
        self.times_correct = self.times_correct.max(0);
        self.times_incorrect = self.times_incorrect.max(0);
        self.consecutive_incorrect = self.consecutive_incorrect.max(0);
        self.times_studied = self.times_correct + self.times_incorrect;
        self.mastery_level = self.mastery_level.clamp(0, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_default_state_is_valid_and_due() {
        let state = ReviewState::default();
        assert!(state.validate().is_ok());
        assert!(state.is_due(Utc::now()));
        assert_eq!(state.ease_factor, 2.5);
    }

    #[test]
    fn test_is_due_compares_against_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let state = ReviewState {
            next_review_at: Some(now + Duration::days(1)),
            ..ReviewState::default()
        };
        assert!(!state.is_due(now));
        assert!(state.is_due(now + Duration::days(1)));
    }

    #[test]
    fn test_validate_rejects_low_ease() {
        let state = ReviewState {
            ease_factor: 1.1,
            ..ReviewState::default()
        };
        assert!(matches!(
            state.validate(),
            Err(SchedulerError::InvalidState(_))
        ));
    }

    #[test]
    fn test_validate_rejects_counter_mismatch() {
        let state = ReviewState {
            times_studied: 5,
            times_correct: 2,
            times_incorrect: 1,
            ..ReviewState::default()
        };
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_sanitize_repairs_corrupt_state() {
        let mut state = ReviewState {
            ease_factor: 0.4,
            interval_days: -3,
            repetitions: -1,
            times_studied: 9,
            times_correct: 4,
            times_incorrect: -2,
            consecutive_incorrect: -5,
            mastery_level: 140,
            ..ReviewState::default()
        };
        assert!(state.validate().is_err());

        state.sanitize();

        assert!(state.validate().is_ok());
        assert_eq!(state.ease_factor, MIN_EASE_FACTOR);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.times_incorrect, 0);
        assert_eq!(state.times_studied, 4);
        assert_eq!(state.mastery_level, 100);
    }

    #[test]
    fn test_sanitize_replaces_nan_ease() {
        let mut state = ReviewState {
            ease_factor: f64::NAN,
            ..ReviewState::default()
        };
        state.sanitize();
        assert_eq!(state.ease_factor, INITIAL_EASE_FACTOR);
    }
}
