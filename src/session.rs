//! In-memory storage for study sessions.
//!
//! Holds `StudySession`s keyed by a random session ID. Sessions auto-expire after
//! `config::SESSION_EXPIRY_HOURS` of inactivity. The store is an explicit value
//! owned by the caller; there is no process-wide instance.

use crate::config;
use crate::srs::StudySession;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Session entry with last access time for expiration
struct SessionEntry {
  session: StudySession,
  last_access: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionStore {
  sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
    // A panic mid-update leaves at worst a stale session behind
    self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Store a new session and return its ID
  pub fn start(&self, session: StudySession) -> String {
    let id = generate_session_id();
    self.update(&id, session);
    id
  }

  /// Get a copy of a live session
  pub fn get(&self, session_id: &str) -> Option<StudySession> {
    self.get_at(session_id, Utc::now())
  }

  pub fn get_at(&self, session_id: &str, now: DateTime<Utc>) -> Option<StudySession> {
    let mut sessions = self.lock();

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions, now);
    }

    let entry = sessions.get_mut(session_id)?;
    if is_expired(entry, now) {
      sessions.remove(session_id);
      return None;
    }
    entry.last_access = now;
    Some(entry.session.clone())
  }

  /// Update a session
  pub fn update(&self, session_id: &str, session: StudySession) {
    self.update_at(session_id, session, Utc::now());
  }

  pub fn update_at(&self, session_id: &str, session: StudySession, now: DateTime<Utc>) {
    self.lock().insert(
      session_id.to_string(),
      SessionEntry {
        session,
        last_access: now,
      },
    );
  }

  /// Drop a finished or abandoned session
  pub fn end(&self, session_id: &str) -> Option<StudySession> {
    self.lock().remove(session_id).map(|entry| entry.session)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub fn purge_expired(&self, now: DateTime<Utc>) {
    cleanup_expired(&mut self.lock(), now);
  }
}

fn is_expired(entry: &SessionEntry, now: DateTime<Utc>) -> bool {
  entry.last_access <= now - Duration::hours(config::SESSION_EXPIRY_HOURS)
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
  sessions.retain(|_, entry| !is_expired(entry, now));
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Card;
  use crate::srs::{SessionLayout, SessionRating};

  fn session(now: DateTime<Utc>) -> StudySession {
    let new = vec![Card::new_at("a", "k", now), Card::new_at("b", "k", now)];
    StudySession::start_at(vec![], new, &SessionLayout::default(), now)
  }

  #[test]
  fn test_generate_session_id_format() {
    let id = generate_session_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_session_id());
  }

  #[test]
  fn test_start_and_get() {
    let store = SessionStore::new();
    let now = Utc::now();
    let id = store.start(session(now));
    let stored = store.get(&id).unwrap();
    assert_eq!(stored.queue_ids(), vec!["a", "b"]);
    assert!(store.get("missing").is_none());
  }

  #[test]
  fn test_update_persists_queue_changes() {
    let store = SessionStore::new();
    let now = Utc::now();
    let id = store.start(session(now));

    let mut live = store.get_at(&id, now).unwrap();
    live.rate_current(SessionRating::Easy);
    store.update_at(&id, live, now);

    assert_eq!(store.get_at(&id, now).unwrap().queue_ids(), vec!["b"]);
  }

  #[test]
  fn test_expired_session_is_gone() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.update_at("s1", session(now), now);

    let later = now + Duration::hours(config::SESSION_EXPIRY_HOURS) + Duration::minutes(1);
    assert!(store.get_at("s1", later).is_none());
    assert!(store.is_empty());
  }

  #[test]
  fn test_access_refreshes_expiry() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.update_at("s1", session(now), now);

    let half = now + Duration::minutes(40);
    assert!(store.get_at("s1", half).is_some());
    assert!(store.get_at("s1", half + Duration::minutes(40)).is_some());
  }

  #[test]
  fn test_purge_and_end() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.update_at("old", session(now), now - Duration::hours(2));
    store.update_at("fresh", session(now), now);

    store.purge_expired(now);
    assert_eq!(store.len(), 1);
    assert!(store.end("fresh").is_some());
    assert!(store.end("fresh").is_none());
  }
}
