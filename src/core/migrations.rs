//! Versioned data migrations.
//!
//! Each step runs at most once, inside its own transaction, and is recorded in
//! the `system_state` table under `migration:<version>`. Running the set again
//! applies nothing. Steps are listed in [`Migration::ALL`] in application
//! order and must never be reordered once released.

use super::category::{NewCategory, find_category_by_name, insert_category, normalize_name};
use crate::{
    config::{AppConfig, database::create_tables},
    entities::{
        CategoryType, Category, CattlePurchase, Expense, PurchaseStatus, Revenue, SystemState,
        category, cattle_purchase, expense, revenue, system_state,
    },
    errors::Result,
};
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, Iterable, QueryOrder, QuerySelect, Schema, Set,
    TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};
use std::collections::HashMap;
use tracing::{debug, info};

const LEDGER_PREFIX: &str = "migration:";

/// One versioned migration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// Creates every table that does not exist yet
    CreateTables,
    /// Inserts configured default categories missing by (name, type)
    SeedDefaultCategories,
    /// Rewrites legacy purchase status spellings to the current enumeration
    NormalizePurchaseStatus,
    /// Merges categories whose names differ only by case or whitespace
    UnifyCategories,
}

impl Migration {
    /// Every step in application order.
    pub const ALL: [Self; 4] = [
        Self::CreateTables,
        Self::SeedDefaultCategories,
        Self::NormalizePurchaseStatus,
        Self::UnifyCategories,
    ];

    /// Version string recorded in the ledger.
    #[must_use]
    pub const fn version(self) -> &'static str {
        match self {
            Self::CreateTables => "001_create_tables",
            Self::SeedDefaultCategories => "002_seed_default_categories",
            Self::NormalizePurchaseStatus => "003_normalize_purchase_status",
            Self::UnifyCategories => "004_unify_categories",
        }
    }

    fn ledger_key(self) -> String {
        format!("{LEDGER_PREFIX}{}", self.version())
    }

    /// Runs the step against `db` without touching the ledger.
    pub async fn apply<C>(self, db: &C, config: &AppConfig) -> Result<()>
    where
        C: ConnectionTrait,
    {
        match self {
            Self::CreateTables => create_tables(db).await,
            Self::SeedDefaultCategories => seed_default_categories(db, config).await,
            Self::NormalizePurchaseStatus => normalize_purchase_status(db).await,
            Self::UnifyCategories => unify_categories(db).await,
        }
    }
}

async fn ensure_ledger(db: &DatabaseConnection) -> Result<()> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(SystemState);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

async fn is_applied<C>(db: &C, migration: Migration) -> Result<bool>
where
    C: ConnectionTrait,
{
    let entry = SystemState::find()
        .filter(system_state::Column::Key.eq(migration.ledger_key()))
        .one(db)
        .await?;
    Ok(entry.is_some())
}

async fn record_applied<C>(db: &C, migration: Migration) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let entry = system_state::ActiveModel {
        key: Set(migration.ledger_key()),
        value: Set(now.to_rfc3339()),
        updated_at: Set(now.naive_utc()),
        ..Default::default()
    };
    entry.insert(db).await?;
    Ok(())
}

/// Versions already recorded in the ledger, in application order.
pub async fn applied_migrations(db: &DatabaseConnection) -> Result<Vec<&'static str>> {
    ensure_ledger(db).await?;
    let mut applied = Vec::new();
    for migration in Migration::ALL {
        if is_applied(db, migration).await? {
            applied.push(migration.version());
        }
    }
    Ok(applied)
}

/// Applies every pending migration and returns the versions applied now.
///
/// # Errors
/// Stops at the first failing step. That step's transaction is rolled back
/// and later steps are not attempted.
pub async fn run_migrations(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<Vec<&'static str>> {
    ensure_ledger(db).await?;

    let mut applied = Vec::new();
    for migration in Migration::ALL {
        if is_applied(db, migration).await? {
            debug!(version = migration.version(), "Migration already applied");
            continue;
        }

        let txn = db.begin().await?;
        migration.apply(&txn, config).await?;
        record_applied(&txn, migration).await?;
        txn.commit().await?;

        info!(version = migration.version(), "Migration applied");
        applied.push(migration.version());
    }

    if applied.is_empty() {
        info!("Database schema is up to date");
    }
    Ok(applied)
}

async fn seed_default_categories<C>(db: &C, config: &AppConfig) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut inserted = 0;
    for seed in config.seed_categories() {
        if find_category_by_name(db, &seed.name, seed.category_type)
            .await?
            .is_some()
        {
            continue;
        }
        insert_category(
            db,
            NewCategory {
                name: seed.name,
                category_type: seed.category_type,
                icon: seed.icon,
            },
            true,
        )
        .await?;
        inserted += 1;
    }
    info!(inserted, "Default categories seeded");
    Ok(())
}

/// Spellings (compared upper-cased) that older data used for `status`.
fn legacy_spellings(status: PurchaseStatus) -> Vec<&'static str> {
    let mut spellings = vec![status.as_str()];
    match status {
        PurchaseStatus::Confined => spellings.extend(["ACTIVE", "CONFINADO"]),
        PurchaseStatus::Negotiating => spellings.push("PENDING"),
        _ => {}
    }
    spellings
}

async fn normalize_purchase_status<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    for status in PurchaseStatus::iter() {
        let result = CattlePurchase::update_many()
            .col_expr(cattle_purchase::Column::Status, Expr::value(status.as_str()))
            .filter(
                Expr::expr(Func::upper(Expr::col(cattle_purchase::Column::Status)))
                    .is_in(legacy_spellings(status)),
            )
            .filter(cattle_purchase::Column::Status.ne(status.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected > 0 {
            info!(
                status = status.as_str(),
                rows = result.rows_affected,
                "Purchase status normalized"
            );
        }
    }
    Ok(())
}

async fn unify_categories<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    for category_type in CategoryType::iter() {
        let rows = Category::find()
            .filter(category::Column::CategoryType.eq(category_type))
            .order_by_asc(category::Column::Id)
            .all(db)
            .await?;

        // Normalized name -> canonical (oldest) row
        let mut canonical: HashMap<String, category::Model> = HashMap::new();
        for row in rows {
            let key = normalize_name(&row.name);
            match canonical.get_mut(&key) {
                None => {
                    canonical.insert(key, row);
                }
                Some(keeper) => {
                    if row.is_default && !keeper.is_default {
                        let mut active_model: category::ActiveModel = keeper.clone().into();
                        active_model.is_default = Set(true);
                        *keeper = active_model.update(db).await?;
                    }
                    Category::delete_by_id(row.id).exec(db).await?;
                    info!(duplicate = %row.name, kept = %keeper.name, "Category merged");
                }
            }
        }

        let names: HashMap<String, String> = canonical
            .into_iter()
            .map(|(key, row)| (key, row.name))
            .collect();
        match category_type {
            CategoryType::Expense => repoint_expenses(db, &names).await?,
            CategoryType::Revenue => repoint_revenues(db, &names).await?,
        }
    }
    Ok(())
}

async fn repoint_expenses<C>(db: &C, names: &HashMap<String, String>) -> Result<()>
where
    C: ConnectionTrait,
{
    let used: Vec<String> = Expense::find()
        .select_only()
        .column(expense::Column::Category)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;

    for current in used {
        if let Some(target) = names.get(&normalize_name(&current))
            && *target != current
        {
            let result = Expense::update_many()
                .col_expr(expense::Column::Category, Expr::value(target.clone()))
                .filter(expense::Column::Category.eq(current.as_str()))
                .exec(db)
                .await?;
            debug!(
                from = %current,
                to = %target,
                rows = result.rows_affected,
                "Expense category repointed"
            );
        }
    }
    Ok(())
}

async fn repoint_revenues<C>(db: &C, names: &HashMap<String, String>) -> Result<()>
where
    C: ConnectionTrait,
{
    let used: Vec<String> = Revenue::find()
        .select_only()
        .column(revenue::Column::Category)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;

    for current in used {
        if let Some(target) = names.get(&normalize_name(&current))
            && *target != current
        {
            let result = Revenue::update_many()
                .col_expr(revenue::Column::Category, Expr::value(target.clone()))
                .filter(revenue::Column::Category.eq(current.as_str()))
                .exec(db)
                .await?;
            debug!(
                from = %current,
                to = %target,
                rows = result.rows_affected,
                "Revenue category repointed"
            );
        }
    }
    Ok(())
}
