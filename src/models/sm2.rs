//! SM-2 (SuperMemo 2) spaced repetition algorithm, adapted for binary answers.
//!
//! Learners only report whether they answered correctly. The grader turns that
//! into an SM-2 quality grade and schedules the card:
//! - Confidence is inferred from history when the caller doesn't supply one
//! - Correct answers map to quality 3 (hard), 4 (medium) or 5 (easy)
//! - Incorrect answers always reset interval and repetitions (quality 0)
//! - Successful intervals progress 1 day → 6 days → previous interval × EF
//! - EF is adjusted after each review and has a minimum value of 1.3
//! - Mastery is a 0-100 score recomputed from the counters on every attempt

use super::review_state::{INITIAL_EASE_FACTOR, MIN_EASE_FACTOR};
use super::{Confidence, ReviewState, StudyAttempt};
use chrono::{DateTime, Duration, Utc};

/// Quality recorded for an incorrect answer.
pub const FAILED_QUALITY: u8 = 0;
/// Delay before re-showing a card after an isolated lapse.
pub const RELEARN_DELAY_HOURS: i64 = 4;
/// Upper bound on scheduled intervals, roughly a century.
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

/// Outcome of grading one attempt.
#[derive(Clone, Debug)]
pub struct GradedAttempt {
    pub state: ReviewState,
    pub confidence: Confidence,
    pub quality: u8,
}

/// Output of the SM-2 step alone.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_at: DateTime<Utc>,
}

/// Guesses how confident the learner was from the state before this attempt.
pub fn infer_confidence(prior: &ReviewState, is_correct: bool) -> Confidence {
    if !is_correct || prior.consecutive_incorrect >= 3 {
        Confidence::Hard
    } else if prior.consecutive_incorrect >= 1 || prior.times_studied <= 1 {
        Confidence::Medium
    } else {
        Confidence::Easy
    }
}

/// Applies one attempt to the prior state (or to a fresh state for a card
/// never studied before) and returns the new state.
///
/// A prior state that breaks its invariants is clamped back into range first.
pub fn record_attempt(prior: Option<&ReviewState>, attempt: &StudyAttempt) -> GradedAttempt {
    let mut prior = prior.cloned().unwrap_or_default();
    if let Err(err) = prior.validate() {
        tracing::warn!(
            user = %attempt.user_id,
            card = attempt.card_id,
            error = %err,
            "repairing review state before grading"
        );
        prior.sanitize();
    }
    let confidence = attempt
        .confidence
        .unwrap_or_else(|| infer_confidence(&prior, attempt.is_correct));
    let quality = if attempt.is_correct {
        confidence.quality()
    } else {
        FAILED_QUALITY
    };

    let schedule = calculate_next_review(&prior, quality, attempt.occurred_at);

    let mut state = prior;
    state.times_studied += 1;
    if attempt.is_correct {
        state.times_correct += 1;
        state.consecutive_incorrect = 0;
    } else {
        state.times_incorrect += 1;
        state.consecutive_incorrect += 1;
    }
    state.ease_factor = schedule.ease_factor;
    state.interval_days = schedule.interval_days;
    state.repetitions = schedule.repetitions;
    state.last_studied_at = Some(attempt.occurred_at);
    state.next_review_at = Some(schedule.next_review_at);
    state.mastery_level = mastery_level(&state);

    GradedAttempt {
        state,
        confidence,
        quality,
    }
}

/// Calculates the next schedule according to SM-2.
/// `prior` holds the counters as they were before this attempt.
pub fn calculate_next_review(
    prior: &ReviewState,
    quality: u8,
    current_date: DateTime<Utc>,
) -> Schedule {
    let quality = quality.min(5);
    let ease_factor = if prior.ease_factor.is_finite() {
        prior.ease_factor
    } else {
        INITIAL_EASE_FACTOR
    };

    if quality < 3 {
        // An isolated lapse in an otherwise successful history gets a short
        // breather instead of an immediate re-show.
        let isolated_lapse = prior.consecutive_incorrect == 0 && prior.times_incorrect >= 1;
        let next_review_at = if isolated_lapse {
            current_date + Duration::hours(RELEARN_DELAY_HOURS)
        } else {
            current_date
        };
        return Schedule {
            ease_factor: (ease_factor - 0.2).max(MIN_EASE_FACTOR),
            interval_days: 0,
            repetitions: 0,
            next_review_at,
        };
    }

    let q = quality as f64;
    let new_ef = (ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASE_FACTOR);

    let interval_days = match prior.repetitions {
        reps if reps <= 0 => first_success_interval(prior, quality),
        1 => 6,
        _ => {
            let grown = (prior.interval_days.max(1) as f64 * new_ef).ceil();
            grown.min(MAX_INTERVAL_DAYS as f64) as i32
        }
    };

    Schedule {
        ease_factor: new_ef,
        interval_days,
        repetitions: prior.repetitions.max(0) + 1,
        next_review_at: current_date + Duration::days(interval_days as i64),
    }
}

/// Interval after the first success, or the first success after a reset.
fn first_success_interval(prior: &ReviewState, quality: u8) -> i32 {
    // Any failure history, including a heavy struggle, keeps this at one day.
    if prior.times_incorrect == 0 && quality == 5 {
        3
    } else {
        1
    }
}

/// Mastery score in 0..=100 blending success rate, streak length and recent failures.
pub fn mastery_level(state: &ReviewState) -> i32 {
    if state.times_studied <= 0 {
        return 0;
    }
    let success_rate = state.times_correct as f64 / state.times_studied as f64;
    let rep_factor = state.repetitions.clamp(0, 10) as f64 / 10.0;
    let consecutive_penalty = (state.consecutive_incorrect.max(0) * 10).min(30) as f64;

    let score = success_rate * 70.0 + rep_factor * 30.0 - consecutive_penalty;
    (score.round() as i32).clamp(0, 100)
}
