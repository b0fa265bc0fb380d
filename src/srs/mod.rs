pub mod card_selector;
pub mod migration;
pub mod quality;
pub mod session;
pub mod simple;
pub mod sm2;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::domain::Card;

pub use card_selector::{due_cards, find_card, new_cards, related_cards, CardCollection, ALL_DECKS};
pub use migration::{migrate_simple_card, migrate_simple_cards, MigrationReport};
pub use quality::{Quality, RatingScale, SessionRating};
pub use session::{build_session, build_session_with, SessionCard, SessionLayout, SessionStats, StudySession};
pub use simple::SimplePolicy;
pub use sm2::Sm2Policy;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Errors raised by the scheduling core
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewError {
  /// Rating outside [0, 5] or not a number
  InvalidQuality(String),
  CardNotFound(String),
  /// The study session has no card left to rate
  SessionComplete,
}

impl std::fmt::Display for ReviewError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReviewError::InvalidQuality(q) => write!(f, "Invalid quality rating: {}", q),
      ReviewError::CardNotFound(id) => write!(f, "Card not found: {}", id),
      ReviewError::SessionComplete => write!(f, "Study session is already complete"),
    }
  }
}

impl std::error::Error for ReviewError {}

/// A scheduling algorithm: turns (card, quality) into the card's next memory state.
///
/// Implementations are pure. `schedule` never fails because `Quality` is already
/// validated; raw grades go through `review_at`, which rejects anything above 5.
pub trait SchedulingPolicy: Send + Sync {
  fn name(&self) -> &'static str;

  fn schedule(&self, card: &Card, quality: Quality, now: DateTime<Utc>) -> Card;

  fn review_at(&self, card: &Card, quality: u8, now: DateTime<Utc>) -> Result<Card, ReviewError> {
    let quality = Quality::new(quality)?;
    Ok(self.schedule(card, quality, now))
  }

  fn review(&self, card: &Card, quality: u8) -> Result<Card, ReviewError> {
    self.review_at(card, quality, Utc::now())
  }
}

/// Which scheduling policy a deployment runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
  #[default]
  Sm2,
  Simple,
}

impl PolicyKind {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "sm2" => Some(Self::Sm2),
      "simple" => Some(Self::Simple),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Sm2 => "sm2",
      Self::Simple => "simple",
    }
  }

  pub fn build(&self, config: &SchedulerConfig) -> Box<dyn SchedulingPolicy> {
    match self {
      Self::Sm2 => Box::new(Sm2Policy::from_config(config)),
      Self::Simple => Box::new(SimplePolicy),
    }
  }
}

/// `now + interval` where the interval is in (possibly fractional) days.
/// Saturates at the latest representable time instead of overflowing.
pub fn next_review_after(now: DateTime<Utc>, interval_days: f64) -> DateTime<Utc> {
  let millis = (interval_days * MILLIS_PER_DAY).round() as i64;
  Duration::try_milliseconds(millis)
    .and_then(|delta| now.checked_add_signed(delta))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Convert a ladder of minute steps into day fractions.
pub fn minutes_to_days(minutes: &[i64]) -> Vec<f64> {
  minutes.iter().map(|m| *m as f64 / 1440.0).collect()
}
