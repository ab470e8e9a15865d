//! Deck is the pool of cards a study session draws from
use super::Card;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(name: &str, cards: Vec<Card>) -> Self {
        Self {
            name: name.to_string(),
            cards,
        }
    }

    pub fn contains(&self, card_id: i64) -> bool {
        self.cards.iter().any(|card| card.id == card_id)
    }

    pub fn card_ids(&self) -> Vec<i64> {
        self.cards.iter().map(|card| card.id).collect()
    }
}
