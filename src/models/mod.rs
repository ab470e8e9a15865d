pub mod attempt;
pub mod card;
pub mod deck;
pub mod review_state;
pub mod session;
pub mod sm2;
pub mod statistics;

pub use attempt::{Confidence, StudyAttempt};
pub use card::Card;
pub use deck::Deck;
pub use review_state::ReviewState;
pub use session::{DueCard, get_due_items};
pub use sm2::{GradedAttempt, record_attempt};
pub use statistics::{SetStatistics, get_set_statistics};
