//! Card persistence with optimistic per-card versioning

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{Card, CardStatus};
use crate::srs::CardCollection;

const CARD_COLUMNS: &str = "id, deck, tags, interval, ease_factor, repetitions, status, \
                            last_reviewed, next_review, learning_step, version";

/// A stored card together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedCard {
    pub card: Card,
    pub version: i64,
}

pub(crate) fn tags_to_json(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn tags_from_json(idx: usize, json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_timestamp(idx: usize, s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_status(idx: usize, s: &str) -> Result<CardStatus> {
    CardStatus::from_str(s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown card status {:?}", s).into(),
        )
    })
}

/// Insert a card unless its id already exists. Returns whether a row was written.
pub fn insert_card(conn: &Connection, card: &Card) -> Result<bool> {
    let changed = conn.execute(
        r#"
    INSERT OR IGNORE INTO cards (id, deck, tags, interval, ease_factor, repetitions, status,
                                 last_reviewed, next_review, learning_step)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
        params![
            card.id,
            card.deck,
            tags_to_json(&card.tags)?,
            card.interval,
            card.ease_factor,
            card.repetitions,
            card.status.as_str(),
            card.last_reviewed.map(|t| t.to_rfc3339()),
            card.next_review.to_rfc3339(),
            card.learning_step,
        ],
    )?;
    Ok(changed > 0)
}

pub fn get_card(conn: &Connection, id: &str) -> Result<Option<VersionedCard>> {
    conn.query_row(
        &format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS),
        params![id],
        row_to_versioned_card,
    )
    .optional()
}

/// All cards in insertion order
pub fn load_cards(conn: &Connection) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM cards ORDER BY rowid ASC", CARD_COLUMNS))?;
    let cards = stmt
        .query_map([], |row| row_to_versioned_card(row).map(|v| v.card))?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

pub fn load_collection(conn: &Connection) -> Result<CardCollection> {
    Ok(load_cards(conn)?.into_iter().collect())
}

pub fn get_card_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
}

/// Write a reviewed card if nobody else has written it since `expected_version`.
/// Returns false on a version conflict (or if the card is gone).
pub fn save_reviewed_card(conn: &Connection, card: &Card, expected_version: i64) -> Result<bool> {
    let changed = conn.execute(
        r#"
    UPDATE cards
    SET interval = ?1, ease_factor = ?2, repetitions = ?3, status = ?4,
        last_reviewed = ?5, next_review = ?6, learning_step = ?7, version = version + 1
    WHERE id = ?8 AND version = ?9
    "#,
        params![
            card.interval,
            card.ease_factor,
            card.repetitions,
            card.status.as_str(),
            card.last_reviewed.map(|t| t.to_rfc3339()),
            card.next_review.to_rfc3339(),
            card.learning_step,
            card.id,
            expected_version,
        ],
    )?;
    Ok(changed == 1)
}

pub(crate) fn row_to_versioned_card(row: &rusqlite::Row) -> Result<VersionedCard> {
    let tags_json: String = row.get(2)?;
    let status_str: String = row.get(6)?;
    let last_reviewed: Option<String> = row.get(7)?;
    let next_review: String = row.get(8)?;

    let status = parse_status(6, &status_str)?;

    Ok(VersionedCard {
        card: Card {
            id: row.get(0)?,
            deck: row.get(1)?,
            tags: tags_from_json(2, &tags_json)?,
            interval: row.get(3)?,
            ease_factor: row.get(4)?,
            repetitions: row.get(5)?,
            status,
            last_reviewed: last_reviewed.map(|s| parse_timestamp(7, &s)).transpose()?,
            next_review: parse_timestamp(8, &next_review)?,
            learning_step: row.get(9)?,
        },
        version: row.get(10)?,
    })
}
