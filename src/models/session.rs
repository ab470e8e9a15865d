//! Picks the cards for the next study session.
//!
//! Cards that need attention come first (due, low mastery or barely
//! practiced), in deck order. Remaining slots go to cards the user has never
//! studied. Mastered cards that are not due are never used as filler, so a
//! session can come back shorter than requested.

use super::{Card, ReviewState};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Mastery below this keeps a card in rotation even when it's not due.
pub const LOW_MASTERY_THRESHOLD: i32 = 50;
/// Cards studied fewer times than this keep getting practice.
pub const MIN_PRACTICE_COUNT: i32 = 3;

/// A card selected for a session with the state it was selected under.
#[derive(Clone, Debug)]
pub struct DueCard {
    pub card: Card,
    /// For new cards this is a placeholder that is never persisted.
    pub state: ReviewState,
    pub is_new: bool,
}

/// Whether a studied card should be part of the next session.
pub fn needs_review(state: &ReviewState, now: DateTime<Utc>) -> bool {
    state.is_due(now)
        || state.mastery_level < LOW_MASTERY_THRESHOLD
        || state.times_studied < MIN_PRACTICE_COUNT
}

/// Returns at most `min(target_count, pool.len())` cards.
pub fn get_due_items(
    pool: &[Card],
    states: &HashMap<i64, ReviewState>,
    now: DateTime<Utc>,
    target_count: usize,
) -> Vec<DueCard> {
    let target = target_count.min(pool.len());
    if target == 0 {
        return Vec::new();
    }

    let mut selected: Vec<DueCard> = pool
        .iter()
        .filter_map(|card| {
            states
                .get(&card.id)
                .filter(|state| needs_review(state, now))
                .map(|state| DueCard {
                    card: card.clone(),
                    state: state.clone(),
                    is_new: false,
                })
        })
        .take(target)
        .collect();

    let remaining = target - selected.len();
    selected.extend(
        pool.iter()
            .filter(|card| !states.contains_key(&card.id))
            .take(remaining)
            .map(|card| DueCard {
                card: card.clone(),
                state: ReviewState::default(),
                is_new: true,
            }),
    );

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
    }

    fn pool(size: i64) -> Vec<Card> {
        (1..=size)
            .map(|id| Card::new(id, "Deck", &format!("term {id}"), &format!("def {id}")))
            .collect()
    }

    fn due_state() -> ReviewState {
        ReviewState {
            times_studied: 5,
            times_correct: 5,
            repetitions: 3,
            mastery_level: 88,
            next_review_at: Some(now() - Duration::hours(1)),
            ..ReviewState::default()
        }
    }

    fn low_mastery_state() -> ReviewState {
        ReviewState {
            times_studied: 6,
            times_correct: 2,
            times_incorrect: 4,
            mastery_level: 30,
            next_review_at: Some(now() + Duration::days(2)),
            ..ReviewState::default()
        }
    }

    fn mastered_state() -> ReviewState {
        ReviewState {
            times_studied: 8,
            times_correct: 8,
            repetitions: 8,
            mastery_level: 94,
            next_review_at: Some(now() + Duration::days(30)),
            ..ReviewState::default()
        }
    }

    #[test]
    fn test_mixed_pool_fills_session() {
        let cards = pool(10);
        let mut states = HashMap::new();
        for id in 1..=3 {
            states.insert(id, due_state());
        }
        for id in 4..=5 {
            states.insert(id, low_mastery_state());
        }

        let selected = get_due_items(&cards, &states, now(), 10);

        assert_eq!(selected.len(), 10);
        let ids: Vec<i64> = selected.iter().map(|d| d.card.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert!(selected[..5].iter().all(|d| !d.is_new));
        assert!(selected[5..].iter().all(|d| d.is_new));
    }

    #[test]
    fn test_empty_history_returns_exactly_target() {
        let cards = pool(12);
        let selected = get_due_items(&cards, &HashMap::new(), now(), 5);

        assert_eq!(selected.len(), 5);
        for due in &selected {
            assert!(due.is_new);
            assert_eq!(due.state.times_studied, 0);
            assert_eq!(due.state.mastery_level, 0);
            assert_eq!(due.state.ease_factor, 2.5);
            assert_eq!(due.state.interval_days, 0);
            assert_eq!(due.state.repetitions, 0);
            assert!(due.state.next_review_at.is_none());
        }
    }

    #[test]
    fn test_target_clamped_to_pool() {
        let cards = pool(3);
        let selected = get_due_items(&cards, &HashMap::new(), now(), 50);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_empty_pool() {
        assert!(get_due_items(&[], &HashMap::new(), now(), 10).is_empty());
    }

    #[test]
    fn test_mastered_cards_are_not_forced_in() {
        let cards = pool(4);
        let mut states = HashMap::new();
        for id in 1..=4 {
            states.insert(id, mastered_state());
        }
        states.insert(2, due_state());

        let selected = get_due_items(&cards, &states, now(), 4);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].card.id, 2);
    }

    #[test]
    fn test_review_cards_capped_before_padding() {
        let cards = pool(6);
        let mut states = HashMap::new();
        for id in 1..=4 {
            states.insert(id, due_state());
        }

        let selected = get_due_items(&cards, &states, now(), 3);

        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|d| !d.is_new));
        assert_eq!(selected[2].card.id, 3);
    }

    #[test]
    fn test_under_practiced_card_selected_even_if_not_due() {
        let cards = pool(1);
        let mut states = HashMap::new();
        states.insert(
            1,
            ReviewState {
                times_studied: 2,
                times_correct: 2,
                repetitions: 2,
                mastery_level: 76,
                next_review_at: Some(now() + Duration::days(6)),
                ..ReviewState::default()
            },
        );

        assert_eq!(get_due_items(&cards, &states, now(), 1).len(), 1);
    }

    #[test]
    fn test_selector_bound_over_many_shapes() {
        let cards = pool(8);
        let mut states = HashMap::new();
        states.insert(1, due_state());
        states.insert(3, mastered_state());
        states.insert(6, low_mastery_state());

        for target in 0..12 {
            let selected = get_due_items(&cards, &states, now(), target);
            assert!(selected.len() <= target.min(cards.len()));
        }
    }
}
