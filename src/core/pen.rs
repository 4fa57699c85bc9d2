//! Pen business logic - creating, listing and maintaining pens.
//!
//! Pen numbers are unique across the feedlot. Capacity is a head count and may be
//! zero (a pen under construction) but never negative.

use super::{Page, require_non_negative, require_text};
use crate::{
    entities::{Pen, PenStatus, PenType, pen},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing a pen
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPen {
    /// Painted pen number
    pub pen_number: String,
    /// Maximum number of animals
    pub capacity: i32,
    /// Operational state, `AVAILABLE` when omitted
    #[serde(default = "default_status")]
    pub status: PenStatus,
    /// Purpose of the pen
    pub pen_type: PenType,
    /// Active flag, `true` when omitted
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_status() -> PenStatus {
    PenStatus::Available
}

const fn default_active() -> bool {
    true
}

/// Optional filters for [`list_pens`]
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenFilter {
    /// Only pens in this state
    pub status: Option<PenStatus>,
    /// Only active (or inactive) pens
    pub is_active: Option<bool>,
}

fn filtered(filter: PenFilter) -> Select<Pen> {
    let mut select = Pen::find();
    if let Some(status) = filter.status {
        select = select.filter(pen::Column::Status.eq(status));
    }
    if let Some(active) = filter.is_active {
        select = select.filter(pen::Column::IsActive.eq(active));
    }
    select
}

/// Lists pens ordered by pen number.
pub async fn list_pens(
    db: &DatabaseConnection,
    filter: PenFilter,
    page: Page,
) -> Result<Vec<pen::Model>> {
    page.apply(filtered(filter).order_by_asc(pen::Column::PenNumber))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every pen, used by the aggregation layer.
pub async fn get_all_pens(db: &DatabaseConnection) -> Result<Vec<pen::Model>> {
    Pen::find()
        .order_by_asc(pen::Column::PenNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts pens matching the filter.
pub async fn count_pens(db: &DatabaseConnection, filter: PenFilter) -> Result<u64> {
    filtered(filter).count(db).await.map_err(Into::into)
}

/// Finds a pen by its unique ID.
pub async fn get_pen_by_id(db: &DatabaseConnection, pen_id: i64) -> Result<Option<pen::Model>> {
    Pen::find_by_id(pen_id).one(db).await.map_err(Into::into)
}

async fn ensure_number_free(
    db: &DatabaseConnection,
    pen_number: &str,
    except_id: Option<i64>,
) -> Result<()> {
    let existing = Pen::find()
        .filter(pen::Column::PenNumber.eq(pen_number))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except_id => Err(Error::Conflict {
            message: format!("pen number '{pen_number}' is already in use"),
        }),
        _ => Ok(()),
    }
}

/// Creates a new pen after validating the number and capacity.
pub async fn create_pen(db: &DatabaseConnection, input: NewPen) -> Result<pen::Model> {
    let pen_number = require_text(&input.pen_number, "pen number")?;
    require_non_negative(input.capacity, "capacity")?;
    ensure_number_free(db, &pen_number, None).await?;

    let model = pen::ActiveModel {
        pen_number: Set(pen_number),
        capacity: Set(input.capacity),
        status: Set(input.status),
        pen_type: Set(input.pen_type),
        is_active: Set(input.is_active),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    tracing::info!(pen_id = result.id, pen_number = %result.pen_number, "Pen created");
    Ok(result)
}

/// Replaces every mutable field of an existing pen.
pub async fn update_pen(db: &DatabaseConnection, pen_id: i64, input: NewPen) -> Result<pen::Model> {
    let pen_number = require_text(&input.pen_number, "pen number")?;
    require_non_negative(input.capacity, "capacity")?;

    let existing = get_pen_by_id(db, pen_id)
        .await?
        .ok_or_else(|| Error::not_found("pen", pen_id))?;
    ensure_number_free(db, &pen_number, Some(pen_id)).await?;

    let mut active_model: pen::ActiveModel = existing.into();
    active_model.pen_number = Set(pen_number);
    active_model.capacity = Set(input.capacity);
    active_model.status = Set(input.status);
    active_model.pen_type = Set(input.pen_type);
    active_model.is_active = Set(input.is_active);

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a pen. Lots allocated to it lose their pen reference.
pub async fn delete_pen(db: &DatabaseConnection, pen_id: i64) -> Result<()> {
    let result = Pen::delete_by_id(pen_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("pen", pen_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_pen_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_pen(&db, new_pen("  ", 10)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_pen(&db, new_pen("P-01", -1)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_pen_number_is_unique() -> Result<()> {
        let db = setup_test_db().await?;
        create_pen(&db, new_pen("P-01", 100)).await?;

        let result = create_pen(&db, new_pen(" P-01 ", 50)).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_pen_keeps_own_number() -> Result<()> {
        let db = setup_test_db().await?;
        let pen = create_pen(&db, new_pen("P-01", 100)).await?;

        let mut input = new_pen("P-01", 150);
        input.status = PenStatus::Maintenance;
        let updated = update_pen(&db, pen.id, input).await?;

        assert_eq!(updated.capacity, 150);
        assert_eq!(updated.status, PenStatus::Maintenance);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_count_with_filter() -> Result<()> {
        let db = setup_test_db().await?;
        create_pen(&db, new_pen("P-02", 100)).await?;
        create_pen(&db, new_pen("P-01", 100)).await?;
        let mut inactive = new_pen("P-03", 100);
        inactive.is_active = false;
        create_pen(&db, inactive).await?;

        let all = list_pens(&db, PenFilter::default(), Page::default()).await?;
        let numbers: Vec<&str> = all.iter().map(|p| p.pen_number.as_str()).collect();
        assert_eq!(numbers, ["P-01", "P-02", "P-03"]);

        let active = PenFilter {
            is_active: Some(true),
            ..PenFilter::default()
        };
        assert_eq!(count_pens(&db, active).await?, 2);

        let first = list_pens(
            &db,
            PenFilter::default(),
            Page {
                limit: Some(1),
                offset: Some(1),
            },
        )
        .await?;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].pen_number, "P-02");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_pen() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_pen(&db, 42).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "pen", .. })));
        Ok(())
    }
}
