//! Recording reviews against the card store.
//!
//! A review is all-or-nothing: the quality is validated before anything is read,
//! and the card update plus its log entry share one transaction. Each write is
//! guarded by the card's version, so two sessions reviewing the same card cannot
//! silently overwrite each other.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::{self, VersionedCard};
use crate::domain::{Card, ReviewLog};
use crate::srs::{Quality, RatingScale, ReviewError, SchedulingPolicy};

#[derive(Debug)]
pub enum ServiceError {
    Review(ReviewError),
    /// The card changed after it was read
    Conflict(String),
    Database(rusqlite::Error),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Review(e) => write!(f, "Could not record review: {}", e),
            ServiceError::Conflict(id) => {
                write!(f, "Could not record review: card {} was modified concurrently", id)
            }
            ServiceError::Database(e) => write!(f, "Could not record review: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Review(e) => Some(e),
            ServiceError::Database(e) => Some(e),
            ServiceError::Conflict(_) => None,
        }
    }
}

impl From<ReviewError> for ServiceError {
    fn from(e: ReviewError) -> Self {
        ServiceError::Review(e)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        ServiceError::Database(e)
    }
}

/// Review the stored card `card_id` with a raw 0-5 quality.
pub fn record_review(
    conn: &Connection,
    policy: &dyn SchedulingPolicy,
    card_id: &str,
    quality: u8,
    now: DateTime<Utc>,
) -> Result<Card, ServiceError> {
    let quality = Quality::new(quality)?;
    let snapshot = db::get_card(conn, card_id)?
        .ok_or_else(|| ReviewError::CardNotFound(card_id.to_string()))?;
    apply(conn, policy, &snapshot, quality, now)
}

/// Review a card from a rating label in the given vocabulary.
pub fn record_rating(
    conn: &Connection,
    policy: &dyn SchedulingPolicy,
    scale: RatingScale,
    card_id: &str,
    rating: &str,
    now: DateTime<Utc>,
) -> Result<Card, ServiceError> {
    let quality = scale.normalize(rating)?;
    record_review(conn, policy, card_id, quality.value(), now)
}

/// Review a card the caller read earlier. Fails with `Conflict` if the stored
/// card has been written since `snapshot` was taken.
pub fn record_review_from_snapshot(
    conn: &Connection,
    policy: &dyn SchedulingPolicy,
    snapshot: &VersionedCard,
    quality: u8,
    now: DateTime<Utc>,
) -> Result<Card, ServiceError> {
    let quality = Quality::new(quality)?;
    apply(conn, policy, snapshot, quality, now)
}

fn apply(
    conn: &Connection,
    policy: &dyn SchedulingPolicy,
    snapshot: &VersionedCard,
    quality: Quality,
    now: DateTime<Utc>,
) -> Result<Card, ServiceError> {
    let updated = policy.schedule(&snapshot.card, quality, now);

    let tx = conn.unchecked_transaction()?;
    if !db::save_reviewed_card(&tx, &updated, snapshot.version)? {
        tracing::warn!(card_id = %snapshot.card.id, version = snapshot.version, "review lost to a concurrent update");
        return Err(ServiceError::Conflict(snapshot.card.id.clone()));
    }
    let log = ReviewLog::from_transition(&snapshot.card, &updated, quality.value(), now);
    db::insert_review_log(&tx, &log)?;
    tx.commit()?;

    tracing::debug!(
        card_id = %updated.id,
        policy = policy.name(),
        status = updated.status.as_str(),
        next_review = %updated.next_review,
        "review recorded"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_card, get_review_count, get_review_logs, insert_card};
    use crate::domain::CardStatus;
    use crate::srs::{SimplePolicy, Sm2Policy};
    use crate::testing::TestEnv;

    fn env_with_card(id: &str) -> TestEnv {
        let env = TestEnv::new().unwrap();
        insert_card(&env.conn, &Card::new(id, "korean")).unwrap();
        env
    }

    #[test]
    fn test_record_review_persists_and_logs() {
        let env = env_with_card("c1");
        let now = Utc::now();

        let updated = record_review(&env.conn, &Sm2Policy::default(), "c1", 4, now).unwrap();
        assert_eq!(updated.status, CardStatus::Learning);

        let stored = get_card(&env.conn, "c1").unwrap().unwrap();
        assert_eq!(stored.card, updated);
        assert_eq!(stored.version, 1);

        let logs = get_review_logs(&env.conn, "c1").unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_before, CardStatus::New);
        assert_eq!(logs[0].quality, 4);
    }

    #[test]
    fn test_invalid_quality_leaves_card_untouched() {
        let env = env_with_card("c1");
        let err = record_review(&env.conn, &Sm2Policy::default(), "c1", 9, Utc::now()).unwrap_err();
        assert!(matches!(err, ServiceError::Review(ReviewError::InvalidQuality(_))));

        let stored = get_card(&env.conn, "c1").unwrap().unwrap();
        assert_eq!(stored.version, 0);
        assert_eq!(stored.card.status, CardStatus::New);
        assert_eq!(get_review_count(&env.conn).unwrap(), 0);
    }

    #[test]
    fn test_unknown_card() {
        let env = TestEnv::new().unwrap();
        let err = record_review(&env.conn, &SimplePolicy, "ghost", 3, Utc::now()).unwrap_err();
        assert!(matches!(err, ServiceError::Review(ReviewError::CardNotFound(id)) if id == "ghost"));
    }

    #[test]
    fn test_stale_snapshot_conflicts() {
        let env = env_with_card("c1");
        let policy = Sm2Policy::default();
        let now = Utc::now();

        // Two sessions read the same card
        let first = get_card(&env.conn, "c1").unwrap().unwrap();
        let second = get_card(&env.conn, "c1").unwrap().unwrap();

        record_review_from_snapshot(&env.conn, &policy, &first, 4, now).unwrap();
        let err = record_review_from_snapshot(&env.conn, &policy, &second, 1, now).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // The losing review wrote nothing
        assert_eq!(get_card(&env.conn, "c1").unwrap().unwrap().version, 1);
        assert_eq!(get_review_count(&env.conn).unwrap(), 1);
    }

    #[test]
    fn test_record_rating_uses_scale() {
        let env = env_with_card("c1");
        let now = Utc::now();
        let policy = SimplePolicy;

        let updated =
            record_rating(&env.conn, &policy, RatingScale::ThreeLevel, "c1", "easy", now).unwrap();
        // easy = 5 on the three-level scale
        assert_eq!(updated.interval, 3.0);
        assert_eq!(get_review_logs(&env.conn, "c1").unwrap()[0].quality, 5);

        let err = record_rating(&env.conn, &policy, RatingScale::ThreeLevel, "c1", "again", now)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Review(ReviewError::InvalidQuality(_))));
    }

    #[test]
    fn test_review_visible_from_other_connection() {
        let env = env_with_card("c1");
        record_review(&env.conn, &Sm2Policy::default(), "c1", 3, Utc::now()).unwrap();
        let other = env.open_connection().unwrap();
        assert_eq!(get_card(&other, "c1").unwrap().unwrap().version, 1);
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::Conflict("c1".into());
        assert_eq!(
            err.to_string(),
            "Could not record review: card c1 was modified concurrently"
        );
    }
}
