use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Complete schema for new databases; upgrades below
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS cards (
      id TEXT PRIMARY KEY,
      deck TEXT NOT NULL,
      tags TEXT NOT NULL DEFAULT '[]',
      interval REAL NOT NULL DEFAULT 0,
      ease_factor REAL NOT NULL DEFAULT 2.5,
      repetitions INTEGER NOT NULL DEFAULT 0,
      status TEXT NOT NULL DEFAULT 'new',
      last_reviewed TEXT,
      next_review TEXT NOT NULL,
      learning_step INTEGER NOT NULL DEFAULT 0,
      version INTEGER NOT NULL DEFAULT 0
    );

    -- Legacy three-state store, read only by the migration
    CREATE TABLE IF NOT EXISTS simple_cards (
      id TEXT PRIMARY KEY,
      front TEXT NOT NULL,
      back TEXT NOT NULL,
      deck TEXT NOT NULL,
      tags TEXT NOT NULL DEFAULT '[]',
      interval REAL NOT NULL DEFAULT 0,
      ease_factor REAL NOT NULL DEFAULT 2.5,
      review_count INTEGER NOT NULL DEFAULT 0,
      last_reviewed TEXT,
      next_review TEXT NOT NULL,
      status TEXT
    );

    CREATE TABLE IF NOT EXISTS review_logs (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      card_id TEXT NOT NULL,
      quality INTEGER NOT NULL,
      status_before TEXT NOT NULL,
      status_after TEXT NOT NULL,
      interval REAL NOT NULL,
      ease_factor REAL NOT NULL,
      reviewed_at TEXT NOT NULL,
      FOREIGN KEY (card_id) REFERENCES cards(id)
    );

    CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck);
    CREATE INDEX IF NOT EXISTS idx_cards_next_review ON cards(next_review);
    CREATE INDEX IF NOT EXISTS idx_review_logs_card_id ON review_logs(card_id);
    "#,
  )?;

  // Databases created before per-card versioning and ladder tracking
  add_column_if_missing(conn, "cards", "learning_step", "INTEGER NOT NULL DEFAULT 0")?;
  add_column_if_missing(conn, "cards", "version", "INTEGER NOT NULL DEFAULT 0")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
