//! Review history

use rusqlite::{params, Connection, Result};

use super::cards::{parse_status, parse_timestamp};
use crate::domain::ReviewLog;

pub fn insert_review_log(conn: &Connection, log: &ReviewLog) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO review_logs (card_id, quality, status_before, status_after, interval, ease_factor, reviewed_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            log.card_id,
            log.quality,
            log.status_before.as_str(),
            log.status_after.as_str(),
            log.interval,
            log.ease_factor,
            log.reviewed_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Reviews of one card, oldest first
pub fn get_review_logs(conn: &Connection, card_id: &str) -> Result<Vec<ReviewLog>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, card_id, quality, status_before, status_after, interval, ease_factor, reviewed_at
    FROM review_logs
    WHERE card_id = ?1
    ORDER BY id ASC
    "#,
    )?;

    let logs = stmt
        .query_map(params![card_id], |row| {
            let before: String = row.get(3)?;
            let after: String = row.get(4)?;
            let reviewed_at: String = row.get(7)?;
            Ok(ReviewLog {
                id: row.get(0)?,
                card_id: row.get(1)?,
                quality: row.get(2)?,
                status_before: parse_status(3, &before)?,
                status_after: parse_status(4, &after)?,
                interval: row.get(5)?,
                ease_factor: row.get(6)?,
                reviewed_at: parse_timestamp(7, &reviewed_at)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(logs)
}

pub fn get_review_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM review_logs", [], |row| row.get(0))
}
