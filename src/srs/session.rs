//! Study session queue: interleaved construction and in-session re-insertion.
//!
//! The queue front is always the card being shown. Rating it removes it from the
//! front and, depending on the rating tier, puts it back further down:
//! - hard: one position ahead (shown again right after the next card)
//! - normal: `min(5 + times shown this session, 8)` positions ahead
//! - easy: not reinserted, the card is done for this session
//!
//! In-session placement is independent of the card's real schedule, which the
//! scheduling policy updates on every rating.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use super::{Quality, ReviewError, SchedulingPolicy, SessionRating};
use crate::config::SchedulerConfig;
use crate::domain::Card;

const HARD_OFFSET: usize = 1;
const NORMAL_BASE_OFFSET: usize = 5;
const NORMAL_MAX_OFFSET: usize = 8;

/// Card plus counters that only live as long as the session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCard {
  pub card: Card,
  pub repetitions_in_session: u32,
  pub last_rating_in_session: Option<SessionRating>,
}

impl SessionCard {
  pub fn new(card: Card) -> Self {
    Self {
      card,
      repetitions_in_session: 0,
      last_rating_in_session: None,
    }
  }

  pub fn id(&self) -> &str {
    &self.card.id
  }
}

/// How due and new cards are interleaved when a session is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLayout {
  pub warmup_due: usize,
  pub warmup_new: usize,
  pub due_block_size: usize,
}

impl Default for SessionLayout {
  fn default() -> Self {
    Self {
      warmup_due: 2,
      warmup_new: 2,
      due_block_size: 4,
    }
  }
}

impl SessionLayout {
  pub fn from_config(config: &SchedulerConfig) -> Self {
    Self {
      warmup_due: config.warmup_due,
      warmup_new: config.warmup_new,
      due_block_size: config.due_block_size,
    }
  }
}

/// Build a queue with the default 2 + 2 warm-up and 4:1 blocks.
pub fn build_session(due: Vec<Card>, new: Vec<Card>) -> VecDeque<SessionCard> {
  build_session_with(due, new, &SessionLayout::default())
}

/// Warm-up head of due then new cards, followed by blocks of due cards each
/// trailed by a single new card until both pools run out.
pub fn build_session_with(
  due: Vec<Card>,
  new: Vec<Card>,
  layout: &SessionLayout,
) -> VecDeque<SessionCard> {
  let mut due = due.into_iter();
  let mut new = new.into_iter();
  let mut queue = VecDeque::with_capacity(due.len() + new.len());

  queue.extend(due.by_ref().take(layout.warmup_due).map(SessionCard::new));
  queue.extend(new.by_ref().take(layout.warmup_new).map(SessionCard::new));

  let block = layout.due_block_size.max(1);
  loop {
    let before = queue.len();
    queue.extend(due.by_ref().take(block).map(SessionCard::new));
    queue.extend(new.by_ref().take(1).map(SessionCard::new));
    if queue.len() == before {
      break;
    }
  }

  queue
}

/// Aggregate numbers for a finished (or in-progress) session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
  pub unique_cards_seen: usize,
  pub total_reviews: u32,
  pub hard: u32,
  pub normal: u32,
  pub easy: u32,
  pub remaining: usize,
  pub elapsed_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct StudySession {
  queue: VecDeque<SessionCard>,
  started_at: DateTime<Utc>,
  seen: HashSet<String>,
  total_reviews: u32,
  hard: u32,
  normal: u32,
  easy: u32,
}

impl StudySession {
  pub fn new(due: Vec<Card>, new: Vec<Card>, layout: &SessionLayout) -> Self {
    Self::start_at(due, new, layout, Utc::now())
  }

  pub fn start_at(due: Vec<Card>, new: Vec<Card>, layout: &SessionLayout, now: DateTime<Utc>) -> Self {
    Self::from_queue(build_session_with(due, new, layout), now)
  }

  pub fn from_queue(queue: VecDeque<SessionCard>, now: DateTime<Utc>) -> Self {
    tracing::debug!(cards = queue.len(), "study session started");
    Self {
      queue,
      started_at: now,
      seen: HashSet::new(),
      total_reviews: 0,
      hard: 0,
      normal: 0,
      easy: 0,
    }
  }

  pub fn current(&self) -> Option<&SessionCard> {
    self.queue.front()
  }

  pub fn queue(&self) -> &VecDeque<SessionCard> {
    &self.queue
  }

  pub fn queue_ids(&self) -> Vec<&str> {
    self.queue.iter().map(SessionCard::id).collect()
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }

  /// A session is complete once every card has left the queue
  pub fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }

  pub fn started_at(&self) -> DateTime<Utc> {
    self.started_at
  }

  /// Apply an in-session rating to the current card and requeue it.
  /// Returns the rated card, or `None` when the queue is already empty.
  pub fn rate_current(&mut self, rating: SessionRating) -> Option<SessionCard> {
    let mut current = self.queue.pop_front()?;
    current.repetitions_in_session += 1;
    current.last_rating_in_session = Some(rating);

    self.seen.insert(current.card.id.clone());
    self.total_reviews += 1;
    match rating {
      SessionRating::Hard => self.hard += 1,
      SessionRating::Normal => self.normal += 1,
      SessionRating::Easy => self.easy += 1,
    }

    let offset = match rating {
      SessionRating::Hard => Some(HARD_OFFSET),
      SessionRating::Normal => Some(
        (NORMAL_BASE_OFFSET + current.repetitions_in_session as usize).min(NORMAL_MAX_OFFSET),
      ),
      SessionRating::Easy => None,
    };

    if let Some(offset) = offset {
      let position = offset.min(self.queue.len());
      tracing::debug!(card_id = %current.card.id, rating = rating.as_str(), position, "requeued card");
      self.queue.insert(position, current.clone());
    } else {
      tracing::debug!(card_id = %current.card.id, "card done for this session");
    }

    Some(current)
  }

  /// Schedule the current card with `policy`, then requeue it by rating tier.
  /// Returns the updated card for the caller to persist.
  pub fn review_current(
    &mut self,
    policy: &dyn SchedulingPolicy,
    quality: Quality,
    now: DateTime<Utc>,
  ) -> Result<Card, ReviewError> {
    let front = self.queue.front_mut().ok_or(ReviewError::SessionComplete)?;
    let updated = policy.schedule(&front.card, quality, now);
    front.card = updated.clone();
    self.rate_current(SessionRating::from_quality(quality));
    Ok(updated)
  }

  pub fn stats(&self, now: DateTime<Utc>) -> SessionStats {
    SessionStats {
      unique_cards_seen: self.seen.len(),
      total_reviews: self.total_reviews,
      hard: self.hard,
      normal: self.normal,
      easy: self.easy,
      remaining: self.queue.len(),
      elapsed_seconds: (now - self.started_at).num_seconds(),
    }
  }
}
