pub mod json;

pub use json::{CardProgress, ProgressSnapshot};
