/// Database connection management and table creation
pub mod database;

/// Default category configuration seeded on first run
pub mod categories;

/// Application settings loaded from config.toml and the environment
pub mod settings;

pub use settings::{AlertThresholds, AppConfig, AuthConfig, DatabaseConfig, ServerConfig};
