//! Rating vocabularies and the 0-5 quality domain the schedulers consume.
//!
//! Three vocabularies are supported:
//! - 3-level: hard / normal / easy → 1 / 3 / 5
//! - 4-level: again / hard / good / easy → 1 / 2 / 3 / 4
//! - 6-level: raw SM-2 grades 0..5
//!
//! Any scale also accepts a numeric rating, which is clamped to [0, 5] and floored.

use serde::{Deserialize, Serialize};

use super::ReviewError;

/// Recall quality in [0, 5]. A value of 3 or more counts as a successful recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
  pub const MAX: u8 = 5;
  pub const PASSING: u8 = 3;

  /// Strict constructor: anything above 5 is rejected, not clamped.
  pub fn new(value: u8) -> Result<Self, ReviewError> {
    if value > Self::MAX {
      return Err(ReviewError::InvalidQuality(value.to_string()));
    }
    Ok(Self(value))
  }

  /// Coerce an arbitrary number: clamp to [0, 5], then floor.
  pub fn from_number(value: f64) -> Result<Self, ReviewError> {
    if value.is_nan() {
      return Err(ReviewError::InvalidQuality("NaN".to_string()));
    }
    let clamped = value.clamp(0.0, Self::MAX as f64).floor();
    Ok(Self(clamped as u8))
  }

  pub fn value(self) -> u8 {
    self.0
  }

  pub fn is_success(self) -> bool {
    self.0 >= Self::PASSING
  }
}

impl TryFrom<u8> for Quality {
  type Error = ReviewError;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<Quality> for u8 {
  fn from(q: Quality) -> u8 {
    q.0
  }
}

/// User-facing rating vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
  ThreeLevel,
  #[default]
  FourLevel,
  SixLevel,
}

impl RatingScale {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "three_level" | "3" => Some(Self::ThreeLevel),
      "four_level" | "4" => Some(Self::FourLevel),
      "six_level" | "6" => Some(Self::SixLevel),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ThreeLevel => "three_level",
      Self::FourLevel => "four_level",
      Self::SixLevel => "six_level",
    }
  }

  /// Labels in ascending order of quality
  pub fn labels(&self) -> &'static [&'static str] {
    match self {
      Self::ThreeLevel => &["hard", "normal", "easy"],
      Self::FourLevel => &["again", "hard", "good", "easy"],
      Self::SixLevel => &["0", "1", "2", "3", "4", "5"],
    }
  }

  fn quality_for_label(&self, label: &str) -> Option<u8> {
    match (self, label) {
      (Self::ThreeLevel, "hard") => Some(1),
      (Self::ThreeLevel, "normal") => Some(3),
      (Self::ThreeLevel, "easy") => Some(5),
      (Self::FourLevel, "again") => Some(1),
      (Self::FourLevel, "hard") => Some(2),
      (Self::FourLevel, "good") => Some(3),
      (Self::FourLevel, "easy") => Some(4),
      _ => None,
    }
  }

  /// Map a rating label (or a numeric string) onto the quality domain.
  pub fn normalize(&self, rating: &str) -> Result<Quality, ReviewError> {
    let label = rating.trim().to_lowercase();

    if let Some(q) = self.quality_for_label(&label) {
      return Ok(Quality(q));
    }

    match label.parse::<f64>() {
      Ok(n) => Quality::from_number(n),
      Err(_) => Err(ReviewError::InvalidQuality(rating.to_string())),
    }
  }
}

/// In-session tier that decides where a rated card goes in the study queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRating {
  Hard,
  Normal,
  Easy,
}

impl SessionRating {
  /// Failed recalls are hard, a bare pass is normal, anything better is easy.
  pub fn from_quality(quality: Quality) -> Self {
    match quality.value() {
      0..=2 => Self::Hard,
      3 => Self::Normal,
      _ => Self::Easy,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Hard => "hard",
      Self::Normal => "normal",
      Self::Easy => "easy",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_quality_new_accepts_range() {
    for v in 0..=5 {
      assert_eq!(Quality::new(v).unwrap().value(), v);
    }
  }

  #[test]
  fn test_quality_new_rejects_out_of_range() {
    assert!(matches!(Quality::new(6), Err(ReviewError::InvalidQuality(_))));
    assert!(Quality::new(255).is_err());
  }

  #[test]
  fn test_quality_from_number_clamps_and_floors() {
    assert_eq!(Quality::from_number(-3.0).unwrap().value(), 0);
    assert_eq!(Quality::from_number(3.9).unwrap().value(), 3);
    assert_eq!(Quality::from_number(5.0).unwrap().value(), 5);
    assert_eq!(Quality::from_number(42.5).unwrap().value(), 5);
    assert_eq!(Quality::from_number(f64::INFINITY).unwrap().value(), 5);
  }

  #[test]
  fn test_quality_from_number_rejects_nan() {
    assert!(Quality::from_number(f64::NAN).is_err());
  }

  #[test]
  fn test_quality_is_success() {
    assert!(!Quality::new(2).unwrap().is_success());
    assert!(Quality::new(3).unwrap().is_success());
    assert!(Quality::new(5).unwrap().is_success());
  }

  #[test]
  fn test_quality_serde_rejects_out_of_range() {
    let q: Quality = serde_json::from_str("4").unwrap();
    assert_eq!(q.value(), 4);
    assert!(serde_json::from_str::<Quality>("9").is_err());
  }

  #[test]
  fn test_three_level_mapping() {
    let scale = RatingScale::ThreeLevel;
    assert_eq!(scale.normalize("hard").unwrap().value(), 1);
    assert_eq!(scale.normalize("normal").unwrap().value(), 3);
    assert_eq!(scale.normalize("easy").unwrap().value(), 5);
  }

  #[test]
  fn test_four_level_mapping() {
    let scale = RatingScale::FourLevel;
    assert_eq!(scale.normalize("again").unwrap().value(), 1);
    assert_eq!(scale.normalize("hard").unwrap().value(), 2);
    assert_eq!(scale.normalize("good").unwrap().value(), 3);
    assert_eq!(scale.normalize("easy").unwrap().value(), 4);
  }

  #[test]
  fn test_six_level_identity() {
    let scale = RatingScale::SixLevel;
    for v in 0..=5u8 {
      assert_eq!(scale.normalize(&v.to_string()).unwrap().value(), v);
    }
  }

  #[test]
  fn test_normalize_ignores_case_and_whitespace() {
    assert_eq!(RatingScale::FourLevel.normalize("  Good ").unwrap().value(), 3);
    assert_eq!(RatingScale::ThreeLevel.normalize("EASY").unwrap().value(), 5);
  }

  #[test]
  fn test_normalize_numeric_fallback_is_clamped() {
    assert_eq!(RatingScale::ThreeLevel.normalize("7").unwrap().value(), 5);
    assert_eq!(RatingScale::FourLevel.normalize("-1").unwrap().value(), 0);
    assert_eq!(RatingScale::SixLevel.normalize("2.7").unwrap().value(), 2);
  }

  #[test]
  fn test_normalize_unknown_label() {
    assert!(RatingScale::ThreeLevel.normalize("again").is_err());
    assert!(RatingScale::SixLevel.normalize("good").is_err());
    assert!(RatingScale::FourLevel.normalize("").is_err());
  }

  #[test]
  fn test_every_label_normalizes() {
    for scale in [RatingScale::ThreeLevel, RatingScale::FourLevel, RatingScale::SixLevel] {
      for label in scale.labels() {
        assert!(scale.normalize(label).is_ok(), "{} / {}", scale.as_str(), label);
      }
    }
  }

  #[test]
  fn test_rating_scale_from_str() {
    assert_eq!(RatingScale::from_str("three_level"), Some(RatingScale::ThreeLevel));
    assert_eq!(RatingScale::from_str("6"), Some(RatingScale::SixLevel));
    assert_eq!(RatingScale::from_str("five_level"), None);
  }

  #[test]
  fn test_session_rating_from_quality() {
    let tier = |v| SessionRating::from_quality(Quality::new(v).unwrap());
    assert_eq!(tier(0), SessionRating::Hard);
    assert_eq!(tier(2), SessionRating::Hard);
    assert_eq!(tier(3), SessionRating::Normal);
    assert_eq!(tier(4), SessionRating::Easy);
    assert_eq!(tier(5), SessionRating::Easy);
  }
}
