//! Scheduler service tying the grader, the session selector and the
//! statistics to a review store and a clock.
//!
//! Every stored state is validated when it is read back. Corrupt rows are
//! clamped into range and logged instead of failing the computation.

use crate::clock::Clock;
use crate::database::ReviewStore;
use crate::error::{Result, SchedulerError};
use crate::export::json::{export_json_to_path, import_json};
use crate::export::{CardProgress, ProgressSnapshot};
use crate::models::{
    Confidence, Deck, DueCard, ReviewState, SetStatistics, StudyAttempt, get_due_items,
    get_set_statistics, sm2,
};
use std::collections::HashMap;
use std::path::Path;

pub struct Scheduler<S, C> {
    store: S,
    clock: C,
}

impl<S: ReviewStore, C: Clock> Scheduler<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Loads a deck and its cards from the store.
    pub fn load_deck(&self, name: &str) -> Result<Deck> {
        Ok(Deck::new(name, self.store.list_by_pool(name)?))
    }

    /// Grades one answer and persists the resulting state.
    pub fn record_attempt(
        &self,
        deck: &Deck,
        user_id: &str,
        card_id: i64,
        is_correct: bool,
        confidence: Option<Confidence>,
    ) -> Result<ReviewState> {
        ensure_in_deck(deck, card_id)?;

        let mut attempt = StudyAttempt::new(user_id, card_id, is_correct, self.clock.now());
        attempt.confidence = confidence;

        let mut graded = None;
        let state = self.store.update(user_id, card_id, &mut |prior| {
            let result = sm2::record_attempt(prior.as_ref(), &attempt);
            let state = result.state.clone();
            graded = Some(result);
            state
        })?;

        if let Some(graded) = graded {
            tracing::debug!(
                user = user_id,
                card = card_id,
                correct = is_correct,
                confidence = ?graded.confidence,
                quality = graded.quality,
                interval_days = state.interval_days,
                mastery = state.mastery_level,
                "attempt recorded"
            );
        }
        Ok(state)
    }

    /// Cards to study next, see [`get_due_items`].
    pub fn get_due_items(
        &self,
        deck: &Deck,
        user_id: &str,
        target_count: usize,
    ) -> Result<Vec<DueCard>> {
        let states = self.load_states(deck, user_id)?;
        Ok(get_due_items(&deck.cards, &states, self.clock.now(), target_count))
    }

    pub fn get_set_statistics(&self, deck: &Deck, user_id: &str) -> Result<SetStatistics> {
        let states = self.load_states(deck, user_id)?;
        Ok(get_set_statistics(&deck.cards, &states, self.clock.now()))
    }

    /// Forgets a user's progress on one card.
    pub fn reset_card(&self, user_id: &str, card_id: i64) -> Result<bool> {
        let removed = self.store.delete(user_id, card_id)?;
        if removed {
            tracing::info!(user = user_id, card = card_id, "card progress reset");
        }
        Ok(removed)
    }

    /// Forgets a user's progress on every card of a deck. Returns how many states were removed.
    pub fn reset_deck(&self, deck: &Deck, user_id: &str) -> Result<usize> {
        let mut removed = 0;
        for card in &deck.cards {
            if self.store.delete(user_id, card.id)? {
                removed += 1;
            }
        }
        tracing::info!(user = user_id, deck = %deck.name, removed, "deck progress reset");
        Ok(removed)
    }

    pub fn export_progress(&self, deck: &Deck, user_id: &str) -> Result<ProgressSnapshot> {
        let mut states = self.load_states(deck, user_id)?;
        let cards = deck
            .cards
            .iter()
            .filter_map(|card| {
                states.remove(&card.id).map(|state| CardProgress {
                    card_id: card.id,
                    state,
                })
            })
            .collect();

        Ok(ProgressSnapshot {
            user_id: user_id.to_string(),
            deck: deck.name.clone(),
            cards,
        })
    }

    /// Writes every state of a snapshot into the store.
    ///
    /// Nothing is written if any card of the snapshot is missing from the deck.
    pub fn import_progress(&self, deck: &Deck, snapshot: &ProgressSnapshot) -> Result<usize> {
        for progress in &snapshot.cards {
            ensure_in_deck(deck, progress.card_id)?;
        }

        for progress in &snapshot.cards {
            let state = checked(&snapshot.user_id, progress.card_id, progress.state.clone());
            self.store.upsert(&snapshot.user_id, progress.card_id, &state)?;
        }

        tracing::info!(
            user = %snapshot.user_id,
            deck = %deck.name,
            cards = snapshot.cards.len(),
            "progress imported"
        );
        Ok(snapshot.cards.len())
    }

    /// Exports a user's progress on a deck into a JSON file.
    pub fn export_progress_to_path(&self, deck: &Deck, user_id: &str, path: &Path) -> Result<usize> {
        let snapshot = self.export_progress(deck, user_id)?;
        export_json_to_path(&snapshot, path)?;
        tracing::info!(
            user = user_id,
            deck = %deck.name,
            cards = snapshot.cards.len(),
            path = %path.display(),
            "progress exported"
        );
        Ok(snapshot.cards.len())
    }

    /// Imports a JSON progress file written by [`Scheduler::export_progress_to_path`].
    pub fn import_progress_from_path(&self, deck: &Deck, path: &Path) -> Result<usize> {
        let snapshot = import_json(path)?;
        self.import_progress(deck, &snapshot)
    }

    fn load_states(&self, deck: &Deck, user_id: &str) -> Result<HashMap<i64, ReviewState>> {
        let states = self.store.list_states(user_id, &deck.card_ids())?;
        Ok(states
            .into_iter()
            .map(|(card_id, state)| (card_id, checked(user_id, card_id, state)))
            .collect())
    }
}

fn ensure_in_deck(deck: &Deck, card_id: i64) -> Result<()> {
    if deck.contains(card_id) {
        Ok(())
    } else {
        Err(SchedulerError::ItemNotFoundInPool {
            card_id,
            deck: deck.name.clone(),
        })
    }
}

/// Returns the state with any invariant violation clamped away.
fn checked(user_id: &str, card_id: i64, mut state: ReviewState) -> ReviewState {
    if let Err(err) = state.validate() {
        tracing::warn!(user = user_id, card = card_id, error = %err, "repairing stored review state");
        state.sanitize();
    }
    state
}
