pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod scheduler;

pub use clock::{Clock, SimulatedClock, SystemClock};
pub use database::{ReviewStore, SqliteStore};
pub use error::{Result, SchedulerError};
pub use models::{Card, Confidence, Deck, DueCard, ReviewState, SetStatistics, StudyAttempt};
pub use scheduler::Scheduler;
