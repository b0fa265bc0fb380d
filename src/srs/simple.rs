//! Simplified three-state policy (new / learning / review).
//!
//! Its arithmetic is deliberately not SM-2's:
//! - quality ≤ 2: interval drops to 1 day, ease −0.15 (floor 1.3)
//! - quality = 3: interval 0 → 1, 1 → 3, else round(interval × ease); ease unchanged
//! - quality ≥ 4: interval 0 → 3, else round(interval × ease × 1.3); ease +0.15 (cap 3.0)
//!
//! A card whose interval exceeds a week is in review, otherwise it is learning.

use chrono::{DateTime, Utc};

use super::{next_review_after, Quality, SchedulingPolicy};
use crate::domain::{Card, CardStatus, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};

const EASE_STEP: f64 = 0.15;
const MAX_EASE_FACTOR: f64 = 3.0;
const EASY_BONUS: f64 = 1.3;

/// Intervals above this many days count as review
pub const REVIEW_THRESHOLD_DAYS: f64 = 7.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimplePolicy;

/// Status a simple-store card has at the given interval
pub fn status_for_interval(interval: f64) -> CardStatus {
  if interval > REVIEW_THRESHOLD_DAYS {
    CardStatus::Review
  } else {
    CardStatus::Learning
  }
}

impl SchedulingPolicy for SimplePolicy {
  fn name(&self) -> &'static str {
    "simple"
  }

  fn schedule(&self, card: &Card, quality: Quality, now: DateTime<Utc>) -> Card {
    let mut next = card.clone();

    match quality.value() {
      0..=2 => {
        next.interval = 1.0;
        next.ease_factor = (card.ease_factor - EASE_STEP).max(MIN_EASE_FACTOR);
        next.repetitions = 0;
      }
      3 => {
        next.interval = if card.interval <= 0.0 {
          1.0
        } else if card.interval == 1.0 {
          3.0
        } else {
          (card.interval * card.ease_factor).round().min(MAX_INTERVAL_DAYS)
        };
        next.repetitions = card.repetitions + 1;
      }
      _ => {
        next.interval = if card.interval <= 0.0 {
          3.0
        } else {
          (card.interval * card.ease_factor * EASY_BONUS).round().min(MAX_INTERVAL_DAYS)
        };
        next.ease_factor = (card.ease_factor + EASE_STEP).min(MAX_EASE_FACTOR);
        next.repetitions = card.repetitions + 1;
      }
    }

    next.status = status_for_interval(next.interval);
    next.learning_step = 0;
    next.last_reviewed = Some(now);
    next.next_review = next_review_after(now, next.interval);

    tracing::debug!(
      card_id = %card.id,
      quality = quality.value(),
      to = next.status.as_str(),
      interval = next.interval,
      ease = next.ease_factor,
      "simple review"
    );

    next
  }
}
