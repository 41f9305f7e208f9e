pub mod error;
pub mod models;
pub mod validation;
pub mod race;

pub use error::ErrorResponse;
pub use models::*;
pub use validation::*;
pub use race::{RaceEvent, RaceRules, RankingEngine};
