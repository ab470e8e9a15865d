//! Persistence for review states.
//!
//! The scheduler only talks to the [`ReviewStore`] trait. [`db::SqliteStore`]
//! is the implementation shipped with the crate.

pub mod db;

use crate::error::Result;
use crate::models::{Card, ReviewState};
use std::collections::HashMap;

pub use db::SqliteStore;

pub trait ReviewStore: Send + Sync {
    fn get(&self, user_id: &str, card_id: i64) -> Result<Option<ReviewState>>;

    fn upsert(&self, user_id: &str, card_id: i64, state: &ReviewState) -> Result<()>;

    /// All cards of a deck, in insertion order.
    fn list_by_pool(&self, deck: &str) -> Result<Vec<Card>>;

    /// States the user has for the given cards. Cards never studied are absent.
    fn list_states(&self, user_id: &str, card_ids: &[i64]) -> Result<HashMap<i64, ReviewState>>;

    /// Removes a state. Returns whether one existed.
    fn delete(&self, user_id: &str, card_id: i64) -> Result<bool>;

    /// Read-modify-write of one state.
    ///
    /// The default is a plain get followed by an upsert; stores that can do
    /// better (transactions, row locks) should override it so concurrent
    /// attempts on the same card don't lose counter increments.
    fn update(
        &self,
        user_id: &str,
        card_id: i64,
        apply: &mut dyn FnMut(Option<ReviewState>) -> ReviewState,
    ) -> Result<ReviewState> {
        let next = apply(self.get(user_id, card_id)?);
        self.upsert(user_id, card_id, &next)?;
        Ok(next)
    }
}
