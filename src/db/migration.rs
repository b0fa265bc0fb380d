//! Legacy `simple_cards` table → canonical `cards` table

use rusqlite::{params, Connection, Result};

use super::cards::{insert_card, parse_timestamp, tags_from_json, tags_to_json};
use crate::domain::{SimpleCard, SimpleStatus};
use crate::srs::{migrate_simple_card, MigrationReport};

pub fn insert_simple_card(conn: &Connection, card: &SimpleCard) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO simple_cards (id, front, back, deck, tags, interval, ease_factor, review_count,
                              last_reviewed, next_review, status)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    "#,
        params![
            card.id,
            card.front,
            card.back,
            card.deck,
            tags_to_json(&card.tags)?,
            card.interval,
            card.ease_factor,
            card.review_count,
            card.last_reviewed.map(|t| t.to_rfc3339()),
            card.next_review.to_rfc3339(),
            card.status.map(|s| s.as_str()),
        ],
    )?;
    Ok(())
}

pub fn load_simple_cards(conn: &Connection) -> Result<Vec<SimpleCard>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, front, back, deck, tags, interval, ease_factor, review_count,
           last_reviewed, next_review, status
    FROM simple_cards
    ORDER BY rowid ASC
    "#,
    )?;

    let cards = stmt
        .query_map([], |row| {
            let tags: String = row.get(4)?;
            let last_reviewed: Option<String> = row.get(8)?;
            let next_review: String = row.get(9)?;
            let status: Option<String> = row.get(10)?;
            Ok(SimpleCard {
                id: row.get(0)?,
                front: row.get(1)?,
                back: row.get(2)?,
                deck: row.get(3)?,
                tags: tags_from_json(4, &tags)?,
                interval: row.get(5)?,
                ease_factor: row.get(6)?,
                review_count: row.get(7)?,
                last_reviewed: last_reviewed.map(|s| parse_timestamp(8, &s)).transpose()?,
                next_review: parse_timestamp(9, &next_review)?,
                // Unknown labels are treated like a missing status
                status: status.as_deref().and_then(SimpleStatus::from_str),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(cards)
}

/// Copy every legacy record into `cards`, skipping ids that already exist.
/// Runs in one transaction.
pub fn migrate_simple_table(conn: &Connection) -> Result<MigrationReport> {
    let tx = conn.unchecked_transaction()?;
    let mut report = MigrationReport::default();

    for simple in load_simple_cards(&tx)? {
        if insert_card(&tx, &migrate_simple_card(&simple))? {
            report.migrated += 1;
        } else {
            report.skipped += 1;
        }
    }

    tx.commit()?;
    tracing::info!(
        migrated = report.migrated,
        skipped = report.skipped,
        "migrated simple_cards table"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_card, insert_card};
    use crate::domain::{Card, CardStatus};
    use crate::testing::TestEnv;
    use chrono::{Duration, Utc};

    fn simple(id: &str, interval: f64, review_count: u32, status: Option<SimpleStatus>) -> SimpleCard {
        let now = Utc::now();
        SimpleCard {
            id: id.to_string(),
            front: "사과".to_string(),
            back: "apple".to_string(),
            deck: "korean".to_string(),
            tags: vec!["fruit".to_string()],
            interval,
            ease_factor: 2.5,
            review_count,
            last_reviewed: (review_count > 0).then(|| now - Duration::days(2)),
            next_review: now + Duration::days(interval as i64),
            status,
        }
    }

    #[test]
    fn test_simple_cards_roundtrip_through_table() {
        let env = TestEnv::new().unwrap();
        let card = simple("s1", 9.0, 3, Some(SimpleStatus::Review));
        insert_simple_card(&env.conn, &card).unwrap();
        assert_eq!(load_simple_cards(&env.conn).unwrap(), vec![card]);
    }

    #[test]
    fn test_migrate_simple_table_twice() {
        let env = TestEnv::new().unwrap();
        insert_simple_card(&env.conn, &simple("s1", 9.0, 3, None)).unwrap();
        insert_simple_card(&env.conn, &simple("s2", 2.0, 1, None)).unwrap();
        insert_simple_card(&env.conn, &simple("s3", 0.0, 0, None)).unwrap();

        let first = migrate_simple_table(&env.conn).unwrap();
        assert_eq!(first, MigrationReport { migrated: 3, skipped: 0 });

        let second = migrate_simple_table(&env.conn).unwrap();
        assert_eq!(second.migrated, 0);
        assert_eq!(second.skipped, first.migrated);

        let s1 = get_card(&env.conn, "s1").unwrap().unwrap().card;
        assert_eq!(s1.status, CardStatus::Review);
        assert_eq!(s1.repetitions, 3);
        assert_eq!(get_card(&env.conn, "s3").unwrap().unwrap().card.status, CardStatus::New);
    }

    #[test]
    fn test_migrate_keeps_existing_target() {
        let env = TestEnv::new().unwrap();
        insert_card(&env.conn, &Card::new("s1", "japanese")).unwrap();
        insert_simple_card(&env.conn, &simple("s1", 9.0, 3, None)).unwrap();

        let report = migrate_simple_table(&env.conn).unwrap();
        assert_eq!(report, MigrationReport { migrated: 0, skipped: 1 });
        assert_eq!(get_card(&env.conn, "s1").unwrap().unwrap().card.deck, "japanese");
    }
}
