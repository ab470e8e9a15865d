//! Read-only progress report for one user over one deck.
use super::{Card, ReviewState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SetStatistics {
    pub total_cards: usize,
    pub studied_cards: usize,
    pub unstudied_cards: usize,
    /// Cards with mastery of at least 80.
    pub mastered_cards: usize,
    pub due_for_review: usize,
    /// Mean mastery over studied cards, one decimal.
    pub average_mastery: f64,
    /// Share of correct attempts in 0.0..=1.0.
    pub success_rate: f64,
    pub total_attempts: i64,
    pub total_correct: i64,
}

pub fn get_set_statistics(
    pool: &[Card],
    states: &HashMap<i64, ReviewState>,
    now: DateTime<Utc>,
) -> SetStatistics {
    let studied: Vec<&ReviewState> = pool.iter().filter_map(|card| states.get(&card.id)).collect();

    let total_attempts: i64 = studied.iter().map(|s| s.times_studied as i64).sum();
    let total_correct: i64 = studied.iter().map(|s| s.times_correct as i64).sum();
    let mastery_sum: i64 = studied.iter().map(|s| s.mastery_level as i64).sum();

    let average_mastery = if studied.is_empty() {
        0.0
    } else {
        (mastery_sum as f64 / studied.len() as f64 * 10.0).round() / 10.0
    };
    let success_rate = if total_attempts == 0 {
        0.0
    } else {
        total_correct as f64 / total_attempts as f64
    };

    SetStatistics {
        total_cards: pool.len(),
        studied_cards: studied.len(),
        unstudied_cards: pool.len() - studied.len(),
        mastered_cards: studied.iter().filter(|s| s.is_mastered()).count(),
        due_for_review: studied.iter().filter(|s| s.is_due(now)).count(),
        average_mastery,
        success_rate,
        total_attempts,
        total_correct,
    }
}
