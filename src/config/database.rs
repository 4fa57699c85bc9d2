//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! The backend is selected by the scheme of the configured URL, so the same
//! data access layer serves `SQLite` (local, tests) and `PostgreSQL` (production).
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, keeping the schema in step with the models.

use super::settings::DatabaseConfig;
use crate::entities::{
    Category, CattlePurchase, Cycle, Expense, Partner, Pen, Revenue, SaleRecord, SystemState, User,
};
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};
use std::time::Duration;
use tracing::{debug, info};

/// Storage backend selected by the `DATABASE_URL` scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// `sqlite:` URLs
    Sqlite,
    /// `postgres:` / `postgresql:` URLs
    Postgres,
}

impl Backend {
    /// Detects the backend from a connection URL.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for any other scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(Error::Config {
                message: format!(
                    "Unsupported database scheme '{scheme}' (expected sqlite or postgres)"
                ),
            }),
        }
    }
}

/// Establishes a connection pool for the configured database URL.
///
/// Connect and acquire timeouts bound every query made through the pool.
pub async fn create_connection(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let backend = Backend::from_url(&config.url)?;
    info!(?backend, "Connecting to database");

    let timeout = Duration::from_secs(config.connect_timeout_secs);
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);

    Database::connect(options).await.map_err(Into::into)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    debug!(table = entity.table_name(), "Table ensured");
    Ok(())
}

/// Creates every table that does not exist yet.
///
/// Referenced tables are created before the tables holding foreign keys to them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Partner).await?;
    create_table(db, &schema, Pen).await?;
    create_table(db, &schema, Cycle).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, User).await?;
    create_table(db, &schema, CattlePurchase).await?;
    create_table(db, &schema, SaleRecord).await?;
    create_table(db, &schema, Expense).await?;
    create_table(db, &schema, Revenue).await?;
    create_table(db, &schema, SystemState).await?;

    Ok(())
}
