//! SQLite-backed review store
//!
//! Handles database initialization, deck and card bookkeeping, and the
//! per (user, card) review states used by the scheduler.

use super::ReviewStore;
use crate::error::Result;
use crate::models::{Card, Deck, ReviewState};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const STATE_COLUMNS: &str = "card_id, ease_factor, interval_days, repetitions, times_studied, \
     times_correct, times_incorrect, consecutive_incorrect, mastery_level, last_studied_at, \
     next_review_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // An interrupted transaction is rolled back on drop, so the connection stays usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Creates a new deck. Creating an existing deck is a no-op.
    pub fn new_deck(&self, name: &str) -> Result<()> {
        let inserted = self
            .lock()
            .execute("INSERT OR IGNORE INTO decks (name) VALUES (?1)", params![name])?;
        if inserted > 0 {
            tracing::info!(deck = name, "deck created");
        }
        Ok(())
    }

    /// Adds a card to a deck and returns its id.
    ///
    /// If the card already exists (same deck + term) the existing id is returned.
    pub fn add_card(&self, deck: &str, term: &str, definition: &str) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR IGNORE INTO cards (deck_name, term, definition) VALUES (?1, ?2, ?3)",
            params![deck, term, definition],
        )?;

        let card_id: i64 = conn.query_row(
            "SELECT id FROM cards WHERE deck_name = ?1 AND term = ?2",
            params![deck, term],
            |row| row.get(0),
        )?;
        Ok(card_id)
    }

    pub fn list_decks(&self) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY name")?;
        let decks = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(decks)
    }

    /// Loads a deck with all of its cards.
    pub fn load_deck(&self, name: &str) -> Result<Deck> {
        Ok(Deck::new(name, self.list_by_pool(name)?))
    }
}

/// Creates the tables used by the store if they don't exist yet.
fn init_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS decks (
            name TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_name TEXT NOT NULL,
            term TEXT NOT NULL,
            definition TEXT NOT NULL,
            FOREIGN KEY (deck_name) REFERENCES decks(name),
            UNIQUE(deck_name, term)
        );

        CREATE TABLE IF NOT EXISTS review_states (
            user_id TEXT NOT NULL,
            card_id INTEGER NOT NULL,
            ease_factor REAL NOT NULL DEFAULT 2.5,
            interval_days INTEGER NOT NULL DEFAULT 0,
            repetitions INTEGER NOT NULL DEFAULT 0,
            times_studied INTEGER NOT NULL DEFAULT 0,
            times_correct INTEGER NOT NULL DEFAULT 0,
            times_incorrect INTEGER NOT NULL DEFAULT 0,
            consecutive_incorrect INTEGER NOT NULL DEFAULT 0,
            mastery_level INTEGER NOT NULL DEFAULT 0,
            last_studied_at INTEGER,
            next_review_at INTEGER,
            PRIMARY KEY (user_id, card_id),
            FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_name);",
    )?;
    Ok(())
}

fn to_timestamp(time: Option<DateTime<Utc>>) -> Option<i64> {
    time.map(|t| t.timestamp())
}

fn from_timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

/// Maps a row selected with `STATE_COLUMNS` to (card_id, state).
fn state_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, ReviewState)> {
    Ok((
        row.get(0)?,
        ReviewState {
            ease_factor: row.get(1)?,
            interval_days: row.get(2)?,
            repetitions: row.get(3)?,
            times_studied: row.get(4)?,
            times_correct: row.get(5)?,
            times_incorrect: row.get(6)?,
            consecutive_incorrect: row.get(7)?,
            mastery_level: row.get(8)?,
            last_studied_at: from_timestamp(row.get(9)?),
            next_review_at: from_timestamp(row.get(10)?),
        },
    ))
}

fn read_state(conn: &Connection, user_id: &str, card_id: i64) -> Result<Option<ReviewState>> {
    let state = conn
        .query_row(
            &format!("SELECT {STATE_COLUMNS} FROM review_states WHERE user_id = ?1 AND card_id = ?2"),
            params![user_id, card_id],
            state_from_row,
        )
        .optional()?;
    Ok(state.map(|(_, state)| state))
}

fn write_state(conn: &Connection, user_id: &str, card_id: i64, state: &ReviewState) -> Result<()> {
    conn.execute(
        "INSERT INTO review_states (user_id, card_id, ease_factor, interval_days, repetitions,
             times_studied, times_correct, times_incorrect, consecutive_incorrect, mastery_level,
             last_studied_at, next_review_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(user_id, card_id) DO UPDATE SET
             ease_factor = excluded.ease_factor,
             interval_days = excluded.interval_days,
             repetitions = excluded.repetitions,
             times_studied = excluded.times_studied,
             times_correct = excluded.times_correct,
             times_incorrect = excluded.times_incorrect,
             consecutive_incorrect = excluded.consecutive_incorrect,
             mastery_level = excluded.mastery_level,
             last_studied_at = excluded.last_studied_at,
             next_review_at = excluded.next_review_at",
        params![
            user_id,
            card_id,
            state.ease_factor,
            state.interval_days,
            state.repetitions,
            state.times_studied,
            state.times_correct,
            state.times_incorrect,
            state.consecutive_incorrect,
            state.mastery_level,
            to_timestamp(state.last_studied_at),
            to_timestamp(state.next_review_at),
        ],
    )?;
    Ok(())
}

impl ReviewStore for SqliteStore {
    fn get(&self, user_id: &str, card_id: i64) -> Result<Option<ReviewState>> {
        read_state(&self.lock(), user_id, card_id)
    }

    fn upsert(&self, user_id: &str, card_id: i64, state: &ReviewState) -> Result<()> {
        write_state(&self.lock(), user_id, card_id, state)
    }

    fn list_by_pool(&self, deck: &str) -> Result<Vec<Card>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, deck_name, term, definition FROM cards WHERE deck_name = ?1 ORDER BY id",
        )?;

        let cards = stmt
            .query_map(params![deck], |row| {
                Ok(Card {
                    id: row.get(0)?,
                    deck: row.get(1)?,
                    term: row.get(2)?,
                    definition: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<Card>>>()?;

        Ok(cards)
    }

    fn list_states(&self, user_id: &str, card_ids: &[i64]) -> Result<HashMap<i64, ReviewState>> {
        if card_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; card_ids.len()].join(", ");
        let sql = format!(
            "SELECT {STATE_COLUMNS} FROM review_states WHERE user_id = ? AND card_id IN ({placeholders})"
        );

        let mut values: Vec<rusqlite::types::Value> = Vec::with_capacity(card_ids.len() + 1);
        values.push(user_id.to_string().into());
        values.extend(card_ids.iter().map(|&id| id.into()));

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let states = stmt
            .query_map(params_from_iter(values), state_from_row)?
            .collect::<rusqlite::Result<HashMap<i64, ReviewState>>>()?;

        Ok(states)
    }

    fn delete(&self, user_id: &str, card_id: i64) -> Result<bool> {
        let removed = self.lock().execute(
            "DELETE FROM review_states WHERE user_id = ?1 AND card_id = ?2",
            params![user_id, card_id],
        )?;
        Ok(removed > 0)
    }

    /// Runs the read and the write in one transaction while holding the connection lock.
    fn update(
        &self,
        user_id: &str,
        card_id: i64,
        apply: &mut dyn FnMut(Option<ReviewState>) -> ReviewState,
    ) -> Result<ReviewState> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let next = apply(read_state(&tx, user_id, card_id)?);
        write_state(&tx, user_id, card_id, &next)?;

        tx.commit()?;
        Ok(next)
    }
}
