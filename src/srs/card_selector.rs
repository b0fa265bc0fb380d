//! Due/new card queries over an explicit card collection.
//!
//! All queries are pure reads of the slice they are handed. An unknown deck or an
//! empty collection yields an empty result, never an error.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::{Quality, ReviewError, SchedulingPolicy};
use crate::domain::Card;

/// Deck filter value that matches every deck
pub const ALL_DECKS: &str = "all";

fn in_deck(card: &Card, deck: &str) -> bool {
  deck == ALL_DECKS || card.deck == deck
}

/// Reviewed cards whose next review has passed, most overdue first.
pub fn due_cards(cards: &[Card], deck: &str, now: DateTime<Utc>, limit: Option<usize>) -> Vec<Card> {
  let mut due: Vec<Card> = cards
    .iter()
    .filter(|c| c.is_due(now) && in_deck(c, deck))
    .cloned()
    .collect();

  // Stable: equal timestamps keep collection order
  due.sort_by_key(|c| c.next_review);

  if let Some(limit) = limit {
    due.truncate(limit);
  }
  due
}

/// Never-reviewed cards in collection order, truncated to the daily cap.
pub fn new_cards(cards: &[Card], deck: &str, limit: Option<usize>) -> Vec<Card> {
  cards
    .iter()
    .filter(|c| c.is_new() && in_deck(c, deck))
    .take(limit.unwrap_or(usize::MAX))
    .cloned()
    .collect()
}

pub fn find_card<'a>(cards: &'a [Card], id: &str) -> Option<&'a Card> {
  cards.iter().find(|c| c.id == id)
}

/// Other cards sharing at least one tag with `card`, most shared tags first.
pub fn related_cards<'a>(cards: &'a [Card], card: &Card, limit: usize) -> Vec<&'a Card> {
  let tags: HashSet<&str> = card.tags.iter().map(String::as_str).collect();
  if tags.is_empty() {
    return Vec::new();
  }

  let mut scored: Vec<(usize, &Card)> = cards
    .iter()
    .filter(|c| c.id != card.id)
    .filter_map(|c| {
      let shared = c.tags.iter().filter(|t| tags.contains(t.as_str())).count();
      (shared > 0).then_some((shared, c))
    })
    .collect();

  scored.sort_by(|a, b| b.0.cmp(&a.0));
  scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

/// In-memory card collection keyed by id, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct CardCollection {
  cards: Vec<Card>,
}

impl CardCollection {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn cards(&self) -> &[Card] {
    &self.cards
  }

  pub fn contains(&self, id: &str) -> bool {
    self.get(id).is_some()
  }

  pub fn get(&self, id: &str) -> Option<&Card> {
    find_card(&self.cards, id)
  }

  /// Insert a card unless its id is already present. Returns whether it was added.
  pub fn insert(&mut self, card: Card) -> bool {
    if self.contains(&card.id) {
      return false;
    }
    self.cards.push(card);
    true
  }

  /// Replace the stored card with the same id.
  pub fn replace(&mut self, card: Card) -> Result<(), ReviewError> {
    match self.cards.iter_mut().find(|c| c.id == card.id) {
      Some(slot) => {
        *slot = card;
        Ok(())
      }
      None => Err(ReviewError::CardNotFound(card.id)),
    }
  }

  /// Review one card in place. The stored card is only replaced once the
  /// policy has produced the complete new state.
  pub fn apply_review(
    &mut self,
    policy: &dyn SchedulingPolicy,
    id: &str,
    quality: Quality,
    now: DateTime<Utc>,
  ) -> Result<Card, ReviewError> {
    let slot = self
      .cards
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or_else(|| ReviewError::CardNotFound(id.to_string()))?;
    let updated = policy.schedule(slot, quality, now);
    *slot = updated.clone();
    Ok(updated)
  }

  pub fn due_cards(&self, deck: &str, now: DateTime<Utc>, limit: Option<usize>) -> Vec<Card> {
    due_cards(&self.cards, deck, now, limit)
  }

  pub fn new_cards(&self, deck: &str, limit: Option<usize>) -> Vec<Card> {
    new_cards(&self.cards, deck, limit)
  }

  pub fn due_count(&self, deck: &str, now: DateTime<Utc>) -> usize {
    self.cards.iter().filter(|c| c.is_due(now) && in_deck(c, deck)).count()
  }

  /// Earliest review still in the future, if any
  pub fn next_upcoming_review(&self, deck: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    self
      .cards
      .iter()
      .filter(|c| !c.is_new() && in_deck(c, deck) && c.next_review > now)
      .map(|c| c.next_review)
      .min()
  }
}

impl FromIterator<Card> for CardCollection {
  fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
    let mut collection = Self::new();
    for card in iter {
      collection.insert(card);
    }
    collection
  }
}
