//! A single answer given by a learner during a study session.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Easy,
    Medium,
    Hard,
}

impl Confidence {
    /// SM-2 quality grade for a successful recall.
    pub fn quality(self) -> u8 {
        match self {
            Confidence::Easy => 5,
            Confidence::Medium => 4,
            Confidence::Hard => 3,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StudyAttempt {
    pub user_id: String,
    pub card_id: i64,
    pub is_correct: bool,
    pub confidence: Option<Confidence>,
    pub occurred_at: DateTime<Utc>,
}

impl StudyAttempt {
    pub fn new(user_id: &str, card_id: i64, is_correct: bool, occurred_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            card_id,
            is_correct,
            confidence: None,
            occurred_at,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
