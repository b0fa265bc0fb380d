use chrono::{DateTime, Utc};

use super::{minutes_to_days, next_review_after, Quality, SchedulingPolicy};
use crate::config::{self, SchedulerConfig};
use crate::domain::{Card, CardStatus, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};

/// Flat ease penalty applied when a review card lapses
const LAPSE_EASE_PENALTY: f64 = 0.2;

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3
pub fn updated_ease(ease_factor: f64, quality: Quality) -> f64 {
  let q = quality.value() as f64;
  let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
  (ease_factor + ease_delta).max(MIN_EASE_FACTOR)
}

pub fn lapse_ease(ease_factor: f64) -> f64 {
  (ease_factor - LAPSE_EASE_PENALTY).max(MIN_EASE_FACTOR)
}

/// Four-state SM-2: new → learning → review ⇄ relearning.
///
/// Learning and relearning walk a ladder of short steps (in days). A pass
/// advances one step; a fail restarts the ladder. Running off the end of a
/// ladder graduates the card to review with a 1-day interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Sm2Policy {
  learning_steps: Vec<f64>,
  relearning_steps: Vec<f64>,
}

impl Default for Sm2Policy {
  fn default() -> Self {
    Self::new(
      minutes_to_days(&config::DEFAULT_LEARNING_STEPS_MINUTES),
      minutes_to_days(&config::DEFAULT_RELEARNING_STEPS_MINUTES),
    )
  }
}

impl Sm2Policy {
  pub fn new(learning_steps: Vec<f64>, relearning_steps: Vec<f64>) -> Self {
    Self {
      learning_steps,
      relearning_steps,
    }
  }

  pub fn from_config(config: &SchedulerConfig) -> Self {
    Self::new(
      minutes_to_days(&config.learning_steps_minutes),
      minutes_to_days(&config.relearning_steps_minutes),
    )
  }

  pub fn learning_steps(&self) -> &[f64] {
    &self.learning_steps
  }

  pub fn relearning_steps(&self) -> &[f64] {
    &self.relearning_steps
  }

  fn ladder(&self, status: CardStatus) -> &[f64] {
    match status {
      CardStatus::Relearning => &self.relearning_steps,
      _ => &self.learning_steps,
    }
  }

  fn start_ladder(&self, card: &mut Card, status: CardStatus) {
    card.repetitions = 0;
    card.learning_step = 0;
    match self.ladder(status).first() {
      Some(step) => {
        card.status = status;
        card.interval = *step;
      }
      None => graduate(card),
    }
  }

  fn advance_ladder(&self, card: &mut Card, status: CardStatus) {
    let next_step = card.learning_step + 1;
    match self.ladder(status).get(next_step as usize) {
      Some(step) => {
        card.status = status;
        card.learning_step = next_step;
        card.interval = *step;
        card.repetitions = 0;
      }
      None => graduate(card),
    }
  }
}

fn graduate(card: &mut Card) {
  card.status = CardStatus::Review;
  card.repetitions = 1;
  card.interval = 1.0;
  card.learning_step = 0;
}

impl SchedulingPolicy for Sm2Policy {
  fn name(&self) -> &'static str {
    "sm2"
  }

  fn schedule(&self, card: &Card, quality: Quality, now: DateTime<Utc>) -> Card {
    let mut next = card.clone();

    match card.status {
      CardStatus::New => {
        next.ease_factor = updated_ease(card.ease_factor, quality);
        self.start_ladder(&mut next, CardStatus::Learning);
      }
      CardStatus::Learning | CardStatus::Relearning => {
        next.ease_factor = updated_ease(card.ease_factor, quality);
        if quality.is_success() {
          self.advance_ladder(&mut next, card.status);
        } else {
          self.start_ladder(&mut next, card.status);
        }
      }
      CardStatus::Review if quality.is_success() => {
        next.ease_factor = updated_ease(card.ease_factor, quality);
        next.repetitions = card.repetitions + 1;
        next.interval = match next.repetitions {
          1 => 1.0,
          2 => 6.0,
          _ => (card.interval * next.ease_factor).round().min(MAX_INTERVAL_DAYS),
        };
        next.learning_step = 0;
      }
      CardStatus::Review => {
        next.ease_factor = lapse_ease(card.ease_factor);
        self.start_ladder(&mut next, CardStatus::Relearning);
      }
    }

    next.last_reviewed = Some(now);
    next.next_review = next_review_after(now, next.interval);

    tracing::debug!(
      card_id = %card.id,
      quality = quality.value(),
      from = card.status.as_str(),
      to = next.status.as_str(),
      interval = next.interval,
      ease = next.ease_factor,
      "sm2 review"
    );

    next
  }
}
