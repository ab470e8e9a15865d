//! JSON import/export of study progress.
//! A snapshot holds one user's review states for the cards of one deck.

use crate::error::Result;
use crate::models::ReviewState;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardProgress {
    pub card_id: i64,
    pub state: ReviewState,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub deck: String,
    pub cards: Vec<CardProgress>,
}

/// Writes a snapshot to a JSON file at the specified path.
pub fn export_json_to_path(snapshot: &ProgressSnapshot, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(snapshot)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Reads a snapshot from a JSON file.
/// Fails if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: &Path) -> Result<ProgressSnapshot> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let snapshot: ProgressSnapshot = serde_json::from_str(&contents)?;

    tracing::info!(
        user = %snapshot.user_id,
        deck = %snapshot.deck,
        cards = snapshot.cards.len(),
        path = %path.display(),
        "progress snapshot read"
    );
    Ok(snapshot)
}
