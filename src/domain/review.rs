use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Card, CardStatus};

/// One applied review, as appended to the review history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
  pub id: i64,
  pub card_id: String,
  pub quality: u8,
  pub status_before: CardStatus,
  pub status_after: CardStatus,
  pub interval: f64,
  pub ease_factor: f64,
  pub reviewed_at: DateTime<Utc>,
}

impl ReviewLog {
  /// Log entry describing the transition from `before` to `after`.
  pub fn from_transition(before: &Card, after: &Card, quality: u8, reviewed_at: DateTime<Utc>) -> Self {
    Self {
      id: 0,
      card_id: after.id.clone(),
      quality,
      status_before: before.status,
      status_after: after.status,
      interval: after.interval,
      ease_factor: after.ease_factor,
      reviewed_at,
    }
  }

  pub fn is_lapse(&self) -> bool {
    self.status_before == CardStatus::Review && self.status_after == CardStatus::Relearning
  }

  pub fn is_correct(&self) -> bool {
    self.quality >= 3
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn review_card() -> Card {
    let mut card = Card::new("c1", "default");
    card.status = CardStatus::Review;
    card.interval = 6.0;
    card.repetitions = 2;
    card
  }

  #[test]
  fn test_review_log_from_transition() {
    let before = review_card();
    let mut after = before.clone();
    after.interval = 15.0;
    after.repetitions = 3;
    let now = Utc::now();

    let log = ReviewLog::from_transition(&before, &after, 4, now);
    assert_eq!(log.id, 0);
    assert_eq!(log.card_id, "c1");
    assert_eq!(log.quality, 4);
    assert_eq!(log.status_before, CardStatus::Review);
    assert_eq!(log.status_after, CardStatus::Review);
    assert_eq!(log.interval, 15.0);
    assert_eq!(log.reviewed_at, now);
    assert!(log.is_correct());
    assert!(!log.is_lapse());
  }

  #[test]
  fn test_review_log_lapse() {
    let before = review_card();
    let mut after = before.clone();
    after.status = CardStatus::Relearning;

    let log = ReviewLog::from_transition(&before, &after, 1, Utc::now());
    assert!(log.is_lapse());
    assert!(!log.is_correct());
  }

  #[test]
  fn test_review_log_serde_roundtrip() {
    let log = ReviewLog::from_transition(&review_card(), &review_card(), 3, Utc::now());
    let json = serde_json::to_string(&log).unwrap();
    assert!(json.contains("\"status_before\":\"review\""));
    let parsed: ReviewLog = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, log);
  }
}
