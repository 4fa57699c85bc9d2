//! Cycle business logic - production periods.
//!
//! At most one cycle may be `ACTIVE` at a time. The rule is enforced on every
//! create and update; rows that predate the rule are surfaced by the dashboard
//! alerts instead of being rejected on read.

use super::{Page, require_text};
use crate::{
    entities::{Cycle, CycleStatus, cycle},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing a cycle
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCycle {
    /// Display name
    pub name: String,
    /// First day of the cycle
    pub start_date: DateTime<Utc>,
    /// Last day, if known
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Lifecycle state, `PLANNED` when omitted
    #[serde(default = "default_status")]
    pub status: CycleStatus,
}

const fn default_status() -> CycleStatus {
    CycleStatus::Planned
}

fn validate_dates(input: &NewCycle) -> Result<()> {
    match input.end_date {
        Some(end) if end < input.start_date => {
            Err(Error::validation("cycle end date cannot be before its start date"))
        }
        _ => Ok(()),
    }
}

async fn ensure_single_active(db: &DatabaseConnection, except_id: Option<i64>) -> Result<()> {
    let mut select = Cycle::find().filter(cycle::Column::Status.eq(CycleStatus::Active));
    if let Some(id) = except_id {
        select = select.filter(cycle::Column::Id.ne(id));
    }
    if let Some(active) = select.one(db).await? {
        return Err(Error::Conflict {
            message: format!("cycle '{}' is already active", active.name),
        });
    }
    Ok(())
}

fn filtered(status: Option<CycleStatus>) -> Select<Cycle> {
    let mut select = Cycle::find();
    if let Some(status) = status {
        select = select.filter(cycle::Column::Status.eq(status));
    }
    select
}

/// Lists cycles, most recent start first, optionally by status.
pub async fn list_cycles(
    db: &DatabaseConnection,
    status: Option<CycleStatus>,
    page: Page,
) -> Result<Vec<cycle::Model>> {
    page.apply(filtered(status).order_by_desc(cycle::Column::StartDate))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts cycles, optionally in one status.
pub async fn count_cycles(db: &DatabaseConnection, status: Option<CycleStatus>) -> Result<u64> {
    filtered(status).count(db).await.map_err(Into::into)
}

/// All cycles currently marked active. More than one indicates legacy data.
pub async fn get_active_cycles(db: &DatabaseConnection) -> Result<Vec<cycle::Model>> {
    Cycle::find()
        .filter(cycle::Column::Status.eq(CycleStatus::Active))
        .order_by_asc(cycle::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a cycle by its unique ID.
pub async fn get_cycle_by_id(
    db: &DatabaseConnection,
    cycle_id: i64,
) -> Result<Option<cycle::Model>> {
    Cycle::find_by_id(cycle_id).one(db).await.map_err(Into::into)
}

/// Creates a cycle, rejecting a second active one.
pub async fn create_cycle(db: &DatabaseConnection, input: NewCycle) -> Result<cycle::Model> {
    let name = require_text(&input.name, "cycle name")?;
    validate_dates(&input)?;
    if input.status == CycleStatus::Active {
        ensure_single_active(db, None).await?;
    }

    let model = cycle::ActiveModel {
        name: Set(name),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        status: Set(input.status),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    tracing::info!(cycle_id = result.id, status = ?result.status, "Cycle created");
    Ok(result)
}

/// Replaces every mutable field of an existing cycle.
pub async fn update_cycle(
    db: &DatabaseConnection,
    cycle_id: i64,
    input: NewCycle,
) -> Result<cycle::Model> {
    let name = require_text(&input.name, "cycle name")?;
    validate_dates(&input)?;
    let existing = get_cycle_by_id(db, cycle_id)
        .await?
        .ok_or_else(|| Error::not_found("cycle", cycle_id))?;
    if input.status == CycleStatus::Active {
        ensure_single_active(db, Some(cycle_id)).await?;
    }

    let mut active_model: cycle::ActiveModel = existing.into();
    active_model.name = Set(name);
    active_model.start_date = Set(input.start_date);
    active_model.end_date = Set(input.end_date);
    active_model.status = Set(input.status);

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a cycle. Attributed rows keep existing with the reference cleared.
pub async fn delete_cycle(db: &DatabaseConnection, cycle_id: i64) -> Result<()> {
    let result = Cycle::delete_by_id(cycle_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("cycle", cycle_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_second_active_cycle_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        create_cycle(&db, new_cycle("2024 dry season", CycleStatus::Active)).await?;

        let result = create_cycle(&db, new_cycle("2025 dry season", CycleStatus::Active)).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        // A planned cycle is fine
        create_cycle(&db, new_cycle("2025 dry season", CycleStatus::Planned)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_activating_through_update() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_cycle(&db, new_cycle("A", CycleStatus::Active)).await?;
        let second = create_cycle(&db, new_cycle("B", CycleStatus::Planned)).await?;

        // Re-saving the active cycle does not conflict with itself
        update_cycle(&db, first.id, new_cycle("A", CycleStatus::Active)).await?;

        let result = update_cycle(&db, second.id, new_cycle("B", CycleStatus::Active)).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        update_cycle(&db, first.id, new_cycle("A", CycleStatus::Completed)).await?;
        let activated = update_cycle(&db, second.id, new_cycle("B", CycleStatus::Active)).await?;
        assert_eq!(activated.status, CycleStatus::Active);
        assert_eq!(get_active_cycles(&db).await?.len(), 1);
        assert_eq!(count_cycles(&db, Some(CycleStatus::Completed)).await?, 1);
        assert_eq!(count_cycles(&db, None).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_end_before_start_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = new_cycle("Backwards", CycleStatus::Planned);
        input.end_date = Some(input.start_date - Duration::days(1));

        let result = create_cycle(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
