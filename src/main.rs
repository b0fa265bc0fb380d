use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use srs_core::db::{self, LogOnError};
use srs_core::srs::{StudySession, ALL_DECKS};
use srs_core::{config, session::SessionStore};

fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "srs_core=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let scheduler = config::load_scheduler_config();
  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");
  let conn = db::try_lock(&pool).expect("Database lock failed during startup");

  db::migrate_simple_table(&conn).log_warn("Failed to migrate simple_cards");

  let collection = db::load_collection(&conn).expect("Failed to load cards");
  let deck = std::env::args().nth(1).unwrap_or_else(|| ALL_DECKS.to_string());
  let now = Utc::now();

  let due = collection.due_cards(&deck, now, scheduler.due_cards_limit);
  let new = collection.new_cards(&deck, Some(scheduler.new_cards_per_day));
  let (due_count, new_count) = (due.len(), new.len());

  let store = SessionStore::new();
  let session_id = store.start(StudySession::start_at(due, new, &scheduler.session_layout(), now));
  let queued = store.get(&session_id).map(|s| s.len()).unwrap_or(0);

  tracing::info!(
    deck = %deck,
    policy = scheduler.build_policy().name(),
    due = due_count,
    new = new_count,
    queued,
    "Study session ready"
  );

  match collection.next_upcoming_review(&deck, now) {
    Some(next) => tracing::info!("Next upcoming review: {}", next.to_rfc3339()),
    None => tracing::info!("No upcoming reviews scheduled"),
  }
}
