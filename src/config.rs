//! Scheduler configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > defaults,
//! the same order used for the database path.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;
use crate::srs::{PolicyKind, RatingScale, SchedulingPolicy, SessionLayout};

const CONFIG_FILE: &str = "config.toml";

// ==================== Config File ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    scheduler: Option<SchedulerConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "Could not parse config: {}", err),
            ConfigError::Invalid(reason) => write!(f, "Invalid scheduler config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

fn read_app_config() -> Option<AppConfig> {
    let contents = std::fs::read_to_string(CONFIG_FILE).ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring unparsable {}: {}", CONFIG_FILE, e);
            None
        }
    }
}

// ==================== Database Configuration ====================

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    let _ = dotenvy::dotenv();

    if let Some(path) = read_app_config()
        .and_then(|c| c.database)
        .and_then(|db| db.path)
    {
        tracing::info!("Using database from config.toml: {}", path);
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    let default = PathBuf::from(paths::db_path());
    tracing::info!("Using default database path: {}", default.display());
    default
}

// ==================== Scheduler Configuration ====================

/// Learning steps in minutes: 1min → 10min → 1 day
pub const DEFAULT_LEARNING_STEPS_MINUTES: [i64; 3] = [1, 10, 1440];

/// Relearning steps in minutes: 10min → 1 day
pub const DEFAULT_RELEARNING_STEPS_MINUTES: [i64; 2] = [10, 1440];

/// Daily cap on new cards entering a session
pub const DEFAULT_NEW_CARDS_PER_DAY: usize = 20;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub policy: PolicyKind,
    pub rating_scale: RatingScale,
    pub learning_steps_minutes: Vec<i64>,
    pub relearning_steps_minutes: Vec<i64>,
    pub new_cards_per_day: usize,
    pub due_cards_limit: Option<usize>,
    pub warmup_due: usize,
    pub warmup_new: usize,
    pub due_block_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let layout = SessionLayout::default();
        Self {
            policy: PolicyKind::default(),
            rating_scale: RatingScale::default(),
            learning_steps_minutes: DEFAULT_LEARNING_STEPS_MINUTES.to_vec(),
            relearning_steps_minutes: DEFAULT_RELEARNING_STEPS_MINUTES.to_vec(),
            new_cards_per_day: DEFAULT_NEW_CARDS_PER_DAY,
            due_cards_limit: None,
            warmup_due: layout.warmup_due,
            warmup_new: layout.warmup_new,
            due_block_size: layout.due_block_size,
        }
    }
}

impl SchedulerConfig {
    /// Parse the `[scheduler]` table of a config.toml document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let app: AppConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = app.scheduler.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, steps) in [
            ("learning_steps_minutes", &self.learning_steps_minutes),
            ("relearning_steps_minutes", &self.relearning_steps_minutes),
        ] {
            if steps.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
            if steps.iter().any(|m| *m <= 0) {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        if self.due_block_size == 0 {
            return Err(ConfigError::Invalid("due_block_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Override fields from environment variables looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var("SRS_POLICY") {
            match PolicyKind::from_str(&value) {
                Some(policy) => self.policy = policy,
                None => tracing::warn!("Unknown SRS_POLICY {:?}, keeping {}", value, self.policy.as_str()),
            }
        }
        if let Some(value) = var("SRS_RATING_SCALE") {
            match RatingScale::from_str(&value) {
                Some(scale) => self.rating_scale = scale,
                None => tracing::warn!("Unknown SRS_RATING_SCALE {:?}", value),
            }
        }
        if let Some(value) = var("SRS_NEW_CARDS_PER_DAY") {
            match value.parse() {
                Ok(n) => self.new_cards_per_day = n,
                Err(_) => tracing::warn!("Invalid SRS_NEW_CARDS_PER_DAY {:?}", value),
            }
        }
    }

    pub fn build_policy(&self) -> Box<dyn SchedulingPolicy> {
        self.policy.build(self)
    }

    pub fn session_layout(&self) -> SessionLayout {
        SessionLayout::from_config(self)
    }
}

/// Load scheduler config with priority: config.toml > .env > default
pub fn load_scheduler_config() -> SchedulerConfig {
    let _ = dotenvy::dotenv();

    if let Some(config) = read_app_config().and_then(|c| c.scheduler) {
        match config.validate() {
            Ok(()) => {
                tracing::info!("Using scheduler config from {}", CONFIG_FILE);
                return config;
            }
            Err(e) => tracing::warn!("{}; falling back to environment/defaults", e),
        }
    }

    let mut config = SchedulerConfig::default();
    config.apply_env(|key| std::env::var(key).ok());
    tracing::info!(
        policy = config.policy.as_str(),
        rating_scale = config.rating_scale.as_str(),
        new_cards_per_day = config.new_cards_per_day,
        "Using scheduler config from environment/defaults"
    );
    config
}

// ==================== Session Store ====================

/// Session expiration time in hours
pub const SESSION_EXPIRY_HOURS: i64 = 1;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;
