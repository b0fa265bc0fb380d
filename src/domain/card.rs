use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest ease factor any card may carry.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Longest interval, in days, a policy will schedule.
pub const MAX_INTERVAL_DAYS: f64 = 36500.0;

/// Ease factor given to every freshly created card.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Scheduling status of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
  #[default]
  New,
  Learning,
  Review,
  Relearning,
}

impl CardStatus {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "new" => Some(Self::New),
      "learning" => Some(Self::Learning),
      "review" => Some(Self::Review),
      "relearning" => Some(Self::Relearning),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learning => "learning",
      Self::Review => "review",
      Self::Relearning => "relearning",
    }
  }
}

/// Memory state of one flashcard, the record every scheduling policy reads and rewrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  pub id: String,
  pub deck: String,
  #[serde(default)]
  pub tags: Vec<String>,

  /// Days until the next review. Fractional for sub-day learning steps.
  pub interval: f64,
  pub ease_factor: f64,
  /// Consecutive successful recalls since the last lapse
  pub repetitions: u32,
  pub status: CardStatus,
  pub last_reviewed: Option<DateTime<Utc>>,
  pub next_review: DateTime<Utc>,

  /// Position in the learning or relearning ladder (0-based)
  #[serde(default)]
  pub learning_step: u32,
}

impl Card {
  pub fn new(id: impl Into<String>, deck: impl Into<String>) -> Self {
    Self::new_at(id, deck, Utc::now())
  }

  /// Create a new card that is due at `now`.
  pub fn new_at(id: impl Into<String>, deck: impl Into<String>, now: DateTime<Utc>) -> Self {
    Self {
      id: id.into(),
      deck: deck.into(),
      tags: Vec::new(),
      interval: 0.0,
      ease_factor: DEFAULT_EASE_FACTOR,
      repetitions: 0,
      status: CardStatus::New,
      last_reviewed: None,
      next_review: now,
      learning_step: 0,
    }
  }

  pub fn with_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.tags = tags.into_iter().map(Into::into).collect();
    self
  }

  pub fn is_new(&self) -> bool {
    self.status == CardStatus::New
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    !self.is_new() && self.next_review <= now
  }
}

/// Status vocabulary of the legacy three-state store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleStatus {
  New,
  Learning,
  Review,
}

impl SimpleStatus {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "new" => Some(Self::New),
      "learning" => Some(Self::Learning),
      "review" => Some(Self::Review),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learning => "learning",
      Self::Review => "review",
    }
  }
}

/// Card record of the legacy simple store. Only ever read, as migration input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleCard {
  pub id: String,
  pub front: String,
  pub back: String,
  pub deck: String,
  #[serde(default)]
  pub tags: Vec<String>,
  pub interval: f64,
  pub ease_factor: f64,
  pub review_count: u32,
  pub last_reviewed: Option<DateTime<Utc>>,
  pub next_review: DateTime<Utc>,
  /// Older records carry no status at all
  pub status: Option<SimpleStatus>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn test_card_status_from_str() {
    assert_eq!(CardStatus::from_str("new"), Some(CardStatus::New));
    assert_eq!(CardStatus::from_str("learning"), Some(CardStatus::Learning));
    assert_eq!(CardStatus::from_str("review"), Some(CardStatus::Review));
    assert_eq!(CardStatus::from_str("relearning"), Some(CardStatus::Relearning));
  }

  #[test]
  fn test_card_status_from_str_invalid() {
    assert_eq!(CardStatus::from_str(""), None);
    assert_eq!(CardStatus::from_str("Review"), None); // case sensitive
    assert_eq!(CardStatus::from_str("suspended"), None);
  }

  #[test]
  fn test_card_status_as_str_roundtrip() {
    for status in [
      CardStatus::New,
      CardStatus::Learning,
      CardStatus::Review,
      CardStatus::Relearning,
    ] {
      assert_eq!(CardStatus::from_str(status.as_str()), Some(status));
    }
  }

  #[test]
  fn test_card_status_serde_snake_case() {
    let json = serde_json::to_string(&CardStatus::Relearning).unwrap();
    assert_eq!(json, "\"relearning\"");
    let parsed: CardStatus = serde_json::from_str("\"learning\"").unwrap();
    assert_eq!(parsed, CardStatus::Learning);
  }

  #[test]
  fn test_simple_status_has_no_relearning() {
    assert_eq!(SimpleStatus::from_str("relearning"), None);
    assert_eq!(SimpleStatus::from_str("review"), Some(SimpleStatus::Review));
    assert_eq!(SimpleStatus::Learning.as_str(), "learning");
  }

  #[test]
  fn test_card_new_defaults() {
    let now = Utc::now();
    let card = Card::new_at("c1", "korean", now);

    assert_eq!(card.id, "c1");
    assert_eq!(card.deck, "korean");
    assert!(card.tags.is_empty());
    assert_eq!(card.interval, 0.0);
    assert!((card.ease_factor - DEFAULT_EASE_FACTOR).abs() < f64::EPSILON);
    assert_eq!(card.repetitions, 0);
    assert_eq!(card.status, CardStatus::New);
    assert!(card.last_reviewed.is_none());
    assert_eq!(card.next_review, now);
    assert_eq!(card.learning_step, 0);
  }

  #[test]
  fn test_card_with_tags() {
    let card = Card::new("c1", "korean").with_tags(["verb", "food"]);
    assert_eq!(card.tags, vec!["verb".to_string(), "food".to_string()]);
  }

  #[test]
  fn test_new_card_is_never_due() {
    let now = Utc::now();
    let card = Card::new_at("c1", "korean", now - Duration::days(3));
    assert!(!card.is_due(now));
  }

  #[test]
  fn test_review_card_due_boundary() {
    let now = Utc::now();
    let mut card = Card::new_at("c1", "korean", now);
    card.status = CardStatus::Review;
    assert!(card.is_due(now));
    card.next_review = now + Duration::seconds(1);
    assert!(!card.is_due(now));
  }

  #[test]
  fn test_card_json_without_optional_fields() {
    let json = r#"{
      "id": "c9",
      "deck": "default",
      "interval": 6.0,
      "ease_factor": 2.36,
      "repetitions": 2,
      "status": "review",
      "last_reviewed": "2024-01-01T00:00:00Z",
      "next_review": "2024-01-07T00:00:00Z"
    }"#;
    let card: Card = serde_json::from_str(json).unwrap();
    assert!(card.tags.is_empty());
    assert_eq!(card.learning_step, 0);
    assert_eq!(card.status, CardStatus::Review);
  }
}
