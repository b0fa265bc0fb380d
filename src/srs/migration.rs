//! One-way migration from the legacy simple store into canonical cards.
//!
//! The transform is lossy: front/back text stays behind in the legacy store and
//! there is no way back. Records whose id already exists in the target are skipped,
//! so running the migration again is a no-op.

use serde::Serialize;

use super::simple::status_for_interval;
use super::CardCollection;
use crate::domain::{Card, CardStatus, SimpleCard, SimpleStatus, MIN_EASE_FACTOR};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
  pub migrated: usize,
  pub skipped: usize,
}

fn infer_status(simple: &SimpleCard) -> CardStatus {
  let never_reviewed = simple.review_count == 0 && simple.last_reviewed.is_none();
  if never_reviewed {
    return CardStatus::New;
  }

  match simple.status {
    Some(SimpleStatus::Review) => CardStatus::Review,
    Some(SimpleStatus::Learning) | Some(SimpleStatus::New) => CardStatus::Learning,
    None => status_for_interval(simple.interval),
  }
}

/// Canonical card for one legacy record. Interval and ease carry over,
/// `review_count` becomes `repetitions`.
pub fn migrate_simple_card(simple: &SimpleCard) -> Card {
  let status = infer_status(simple);
  Card {
    id: simple.id.clone(),
    deck: simple.deck.clone(),
    tags: simple.tags.clone(),
    interval: simple.interval.max(0.0),
    ease_factor: simple.ease_factor.max(MIN_EASE_FACTOR),
    repetitions: simple.review_count,
    status,
    last_reviewed: if status == CardStatus::New { None } else { simple.last_reviewed },
    next_review: simple.next_review,
    learning_step: 0,
  }
}

pub fn migrate_simple_cards(source: &[SimpleCard], target: &mut CardCollection) -> MigrationReport {
  let mut report = MigrationReport::default();

  for simple in source {
    if target.insert(migrate_simple_card(simple)) {
      report.migrated += 1;
    } else {
      report.skipped += 1;
    }
  }

  tracing::info!(
    migrated = report.migrated,
    skipped = report.skipped,
    "migrated simple cards"
  );
  report
}
