//! Card is a pair <term, definition> that belongs to a deck.
//! The scheduler only looks at the id and the deck name.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub deck: String,
    pub term: String,
    pub definition: String,
}

impl Card {
    pub fn new(id: i64, deck: &str, term: &str, definition: &str) -> Self {
        Self {
            id,
            deck: deck.to_string(),
            term: term.to_string(),
            definition: definition.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let card = Card::new(7, "Polish Vocabulary", "cześć", "hello");

        assert_eq!(card.id, 7);
        assert_eq!(card.deck, "Polish Vocabulary");
        assert_eq!(card.term, "cześć");
        assert_eq!(card.definition, "hello");
    }
}
