//! Revenue business logic - receivables and their receipt.

use super::{DateRange, Page, require_text, validate_amount};
use crate::{
    entities::{Revenue, revenue},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing a revenue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRevenue {
    /// What the money is for
    pub description: String,
    /// Category name
    pub category: String,
    /// Amount receivable
    #[serde(default)]
    pub total_amount: Option<f64>,
    /// Already received
    #[serde(default)]
    pub is_received: bool,
    /// Expected or actual receipt date
    #[serde(default)]
    pub received_date: Option<DateTime<Utc>>,
    /// Originating sale
    #[serde(default)]
    pub sale_id: Option<i64>,
    /// Attributed cycle
    #[serde(default)]
    pub cycle_id: Option<i64>,
}

/// Optional filters for [`list_revenues`]
#[derive(Debug, Clone, Default)]
pub struct RevenueFilter {
    /// Window on `received_date`
    pub range: DateRange,
    /// Only received (or pending) revenues
    pub is_received: Option<bool>,
    /// Only this category name
    pub category: Option<String>,
}

fn filtered(filter: RevenueFilter) -> Select<Revenue> {
    let mut select = filter
        .range
        .apply(Revenue::find(), revenue::Column::ReceivedDate);
    if let Some(received) = filter.is_received {
        select = select.filter(revenue::Column::IsReceived.eq(received));
    }
    if let Some(category) = filter.category {
        select = select.filter(revenue::Column::Category.eq(category));
    }
    select
}

async fn validate(db: &DatabaseConnection, input: &NewRevenue) -> Result<(String, String)> {
    let description = require_text(&input.description, "description")?;
    let category = require_text(&input.category, "category")?;
    validate_amount(input.total_amount)?;

    if let Some(sale_id) = input.sale_id
        && super::sale::get_sale_by_id(db, sale_id).await?.is_none()
    {
        return Err(Error::not_found("sale", sale_id));
    }
    if let Some(cycle_id) = input.cycle_id
        && super::cycle::get_cycle_by_id(db, cycle_id).await?.is_none()
    {
        return Err(Error::not_found("cycle", cycle_id));
    }
    Ok((description, category))
}

/// Lists revenues by receipt date, soonest first.
pub async fn list_revenues(
    db: &DatabaseConnection,
    filter: RevenueFilter,
    page: Page,
) -> Result<Vec<revenue::Model>> {
    page.apply(filtered(filter).order_by_asc(revenue::Column::ReceivedDate))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every revenue matching the filter, without pagination. Used for aggregation.
pub async fn get_all_revenues(
    db: &DatabaseConnection,
    filter: RevenueFilter,
) -> Result<Vec<revenue::Model>> {
    filtered(filter)
        .order_by_asc(revenue::Column::ReceivedDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts revenues matching the filter.
pub async fn count_revenues(db: &DatabaseConnection, filter: RevenueFilter) -> Result<u64> {
    filtered(filter).count(db).await.map_err(Into::into)
}

/// Finds a revenue by its unique ID.
pub async fn get_revenue_by_id(
    db: &DatabaseConnection,
    revenue_id: i64,
) -> Result<Option<revenue::Model>> {
    Revenue::find_by_id(revenue_id).one(db).await.map_err(Into::into)
}

/// Creates a revenue.
pub async fn create_revenue(db: &DatabaseConnection, input: NewRevenue) -> Result<revenue::Model> {
    let (description, category) = validate(db, &input).await?;

    let model = revenue::ActiveModel {
        description: Set(description),
        category: Set(category),
        total_amount: Set(input.total_amount),
        is_received: Set(input.is_received),
        received_date: Set(input.received_date),
        sale_id: Set(input.sale_id),
        cycle_id: Set(input.cycle_id),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Replaces every mutable field of an existing revenue.
pub async fn update_revenue(
    db: &DatabaseConnection,
    revenue_id: i64,
    input: NewRevenue,
) -> Result<revenue::Model> {
    let (description, category) = validate(db, &input).await?;
    let existing = get_revenue_by_id(db, revenue_id)
        .await?
        .ok_or_else(|| Error::not_found("revenue", revenue_id))?;

    let mut active_model: revenue::ActiveModel = existing.into();
    active_model.description = Set(description);
    active_model.category = Set(category);
    active_model.total_amount = Set(input.total_amount);
    active_model.is_received = Set(input.is_received);
    active_model.received_date = Set(input.received_date);
    active_model.sale_id = Set(input.sale_id);
    active_model.cycle_id = Set(input.cycle_id);

    active_model.update(db).await.map_err(Into::into)
}

/// Marks a revenue as received at `received_at`.
pub async fn mark_revenue_received(
    db: &DatabaseConnection,
    revenue_id: i64,
    received_at: DateTime<Utc>,
) -> Result<revenue::Model> {
    let existing = get_revenue_by_id(db, revenue_id)
        .await?
        .ok_or_else(|| Error::not_found("revenue", revenue_id))?;
    if existing.is_received {
        return Err(Error::Conflict {
            message: format!("revenue {revenue_id} is already received"),
        });
    }

    let mut active_model: revenue::ActiveModel = existing.into();
    active_model.is_received = Set(true);
    active_model.received_date = Set(Some(received_at));
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a revenue.
pub async fn delete_revenue(db: &DatabaseConnection, revenue_id: i64) -> Result<()> {
    let result = Revenue::delete_by_id(revenue_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("revenue", revenue_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_revenue_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = new_revenue(Some(100.0), false, None);
        input.category = "  ".to_string();
        let result = create_revenue(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_revenue(&db, new_revenue(Some(f64::NAN), false, None)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let mut input = new_revenue(Some(100.0), false, None);
        input.sale_id = Some(5);
        let result = create_revenue(&db, input).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "sale", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_received() -> Result<()> {
        let db = setup_test_db().await?;
        let due = Utc::now() - Duration::days(2);
        let created = create_revenue(&db, new_revenue(Some(100.0), false, Some(due))).await?;
        let now = Utc::now();

        let received = mark_revenue_received(&db, created.id, now).await?;
        assert!(received.is_received);
        assert_eq!(received.received_date, Some(now));

        let result = mark_revenue_received(&db, created.id, now).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_pending() -> Result<()> {
        let db = setup_test_db().await?;
        create_revenue(&db, new_revenue(Some(100.0), true, Some(Utc::now()))).await?;
        create_revenue(&db, new_revenue(Some(50.0), false, None)).await?;

        let pending = RevenueFilter {
            is_received: Some(false),
            ..RevenueFilter::default()
        };
        let rows = list_revenues(&db, pending.clone(), Page::default()).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(count_revenues(&db, pending).await?, 1);
        Ok(())
    }
}
