pub mod card;
pub mod review;

pub use card::{Card, CardStatus, SimpleCard, SimpleStatus, DEFAULT_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};
pub use review::ReviewLog;
