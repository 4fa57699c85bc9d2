//! Application settings.
//!
//! Settings come from `config.toml` (every section optional) and are then
//! overridden by environment variables, which `main` may have loaded from a
//! `.env` file beforehand.

use super::categories::{CategoryConfig, default_categories};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Complete application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Dashboard alert thresholds
    pub alerts: AlertThresholds,
    /// API authentication settings
    pub auth: AuthConfig,
    /// Categories seeded on first run; empty means the built-in list
    pub categories: Vec<CategoryConfig>,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,
    /// Upper bound for each aggregation call, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Database settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; the scheme selects the backend (`sqlite:` or `postgres:`)
    pub url: String,
    /// Pool size
    pub max_connections: u32,
    /// Connect and acquire timeout, in seconds
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://feedlot.sqlite?mode=rwc".to_string(),
            max_connections: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Largest accepted alert threshold, in days
pub const MAX_ALERT_DAYS: i64 = 36_500;

/// Thresholds used when scanning for dashboard alerts
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertThresholds {
    /// Unpaid expenses due within this many days raise an info alert
    pub due_soon_days: i64,
    /// Items overdue by more than this many days are critical
    pub critical_overdue_days: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            due_soon_days: 7,
            critical_overdue_days: 30,
        }
    }
}

/// API authentication settings
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When false every request is treated as an admin (local development)
    pub enabled: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Categories to seed, falling back to the built-in list.
    #[must_use]
    pub fn seed_categories(&self) -> Vec<CategoryConfig> {
        if self.categories.is_empty() {
            default_categories()
        } else {
            self.categories.clone()
        }
    }

    /// Applies environment overrides using the given lookup.
    ///
    /// Recognized keys: `DATABASE_URL`, `BIND_ADDR`, `REQUEST_TIMEOUT_SECS`,
    /// `AUTH_DISABLED`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = secs.parse().map_err(|e| Error::Config {
                message: format!("REQUEST_TIMEOUT_SECS must be a whole number of seconds: {e}"),
            })?;
        }
        if let Some(flag) = lookup("AUTH_DISABLED") {
            self.auth.enabled = !matches!(flag.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.server.request_timeout_secs == 0 {
            return Err(Error::Config {
                message: "request_timeout_secs must be greater than zero".to_string(),
            });
        }
        let thresholds = [self.alerts.due_soon_days, self.alerts.critical_overdue_days];
        if thresholds.iter().any(|days| !(0..=MAX_ALERT_DAYS).contains(days)) {
            return Err(Error::Config {
                message: format!("alert thresholds must be between 0 and {MAX_ALERT_DAYS} days"),
            });
        }
        super::database::Backend::from_url(&self.database.url)?;
        Ok(())
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads `./config.toml` if present (defaults otherwise), applies process
/// environment overrides and validates the result.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        tracing::info!("No config.toml found, using defaults");
        AppConfig::default()
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.alerts, AlertThresholds::default());
        assert!(config.auth.enabled);
        assert!(!config.seed_categories().is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            request_timeout_secs = 3

            [alerts]
            due_soon_days = 14
            "#,
        )
        .unwrap();
        assert_eq!(config.server.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.server.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.alerts.due_soon_days, 14);
        assert_eq!(config.alerts.critical_overdue_days, 30);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://feedlot@localhost/feedlot"),
            ("REQUEST_TIMEOUT_SECS", "20"),
            ("AUTH_DISABLED", "true"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.database.url, "postgres://feedlot@localhost/feedlot");
        assert_eq!(config.server.request_timeout_secs, 20);
        assert!(!config.auth.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_unknown_backend() {
        let mut config = AppConfig::default();
        config.database.url = "mysql://localhost/feedlot".to_string();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_bounds_alert_thresholds() {
        let config: AppConfig =
            toml::from_str("[alerts]\ndue_soon_days = 9223372036854775807").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let mut config = AppConfig::default();
        config.alerts.critical_overdue_days = -1;
        assert!(config.validate().is_err());

        config.alerts.critical_overdue_days = MAX_ALERT_DAYS;
        assert!(config.validate().is_ok());
    }
}
