//! Sale business logic - heads sold out of a lot.
//!
//! The heads sold across all sales of a lot can never exceed the heads bought.

use super::{DateRange, Page, require_non_negative, validate_amount};
use crate::{
    entities::{SaleRecord, sale_record},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing a sale record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    /// Lot the animals came from
    pub lot_id: i64,
    /// Buying partner
    #[serde(default)]
    pub buyer_id: Option<i64>,
    /// Number of animals sold
    pub head_count: i32,
    /// Sale amount
    #[serde(default)]
    pub amount: Option<f64>,
    /// When the sale happened
    pub sale_date: DateTime<Utc>,
}

/// Optional filters for [`list_sales`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleFilter {
    /// Window on `sale_date`
    pub range: DateRange,
    /// Only sales out of this lot
    pub lot_id: Option<i64>,
}

fn filtered(filter: SaleFilter) -> Select<SaleRecord> {
    let mut select = filter
        .range
        .apply(SaleRecord::find(), sale_record::Column::SaleDate);
    if let Some(lot_id) = filter.lot_id {
        select = select.filter(sale_record::Column::LotId.eq(lot_id));
    }
    select
}

async fn validate(db: &DatabaseConnection, input: &NewSale, except_id: Option<i64>) -> Result<()> {
    require_non_negative(input.head_count, "head count")?;
    validate_amount(input.amount)?;

    let lot = super::purchase::get_purchase_by_id(db, input.lot_id)
        .await?
        .ok_or_else(|| Error::not_found("purchase", input.lot_id))?;
    if let Some(buyer_id) = input.buyer_id
        && super::partner::get_partner_by_id(db, buyer_id).await?.is_none()
    {
        return Err(Error::not_found("partner", buyer_id));
    }

    let already_sold: i64 = get_all_sales(
        db,
        SaleFilter {
            lot_id: Some(lot.id),
            ..SaleFilter::default()
        },
    )
    .await?
    .iter()
    .filter(|s| Some(s.id) != except_id)
    .map(|s| i64::from(s.head_count))
    .sum();
    let remaining = i64::from(lot.head_count) - already_sold;
    if i64::from(input.head_count) > remaining {
        return Err(Error::Conflict {
            message: format!(
                "lot '{}' has {remaining} head(s) left, cannot sell {}",
                lot.lot_code, input.head_count
            ),
        });
    }
    Ok(())
}

/// Lists sales, newest first.
pub async fn list_sales(
    db: &DatabaseConnection,
    filter: SaleFilter,
    page: Page,
) -> Result<Vec<sale_record::Model>> {
    page.apply(filtered(filter).order_by_desc(sale_record::Column::SaleDate))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every sale matching the filter, without pagination. Used for aggregation.
pub async fn get_all_sales(
    db: &DatabaseConnection,
    filter: SaleFilter,
) -> Result<Vec<sale_record::Model>> {
    filtered(filter)
        .order_by_asc(sale_record::Column::SaleDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts sales matching the filter.
pub async fn count_sales(db: &DatabaseConnection, filter: SaleFilter) -> Result<u64> {
    filtered(filter).count(db).await.map_err(Into::into)
}

/// Finds a sale by its unique ID.
pub async fn get_sale_by_id(
    db: &DatabaseConnection,
    sale_id: i64,
) -> Result<Option<sale_record::Model>> {
    SaleRecord::find_by_id(sale_id).one(db).await.map_err(Into::into)
}

/// Records a sale out of a lot.
pub async fn create_sale(db: &DatabaseConnection, input: NewSale) -> Result<sale_record::Model> {
    validate(db, &input, None).await?;

    let model = sale_record::ActiveModel {
        lot_id: Set(input.lot_id),
        buyer_id: Set(input.buyer_id),
        head_count: Set(input.head_count),
        amount: Set(input.amount),
        sale_date: Set(input.sale_date),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    tracing::info!(
        sale_id = result.id,
        lot_id = result.lot_id,
        heads = result.head_count,
        "Sale recorded"
    );
    Ok(result)
}

/// Replaces every mutable field of an existing sale.
pub async fn update_sale(
    db: &DatabaseConnection,
    sale_id: i64,
    input: NewSale,
) -> Result<sale_record::Model> {
    let existing = get_sale_by_id(db, sale_id)
        .await?
        .ok_or_else(|| Error::not_found("sale", sale_id))?;
    validate(db, &input, Some(sale_id)).await?;

    let mut active_model: sale_record::ActiveModel = existing.into();
    active_model.lot_id = Set(input.lot_id);
    active_model.buyer_id = Set(input.buyer_id);
    active_model.head_count = Set(input.head_count);
    active_model.amount = Set(input.amount);
    active_model.sale_date = Set(input.sale_date);

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a sale record.
pub async fn delete_sale(db: &DatabaseConnection, sale_id: i64) -> Result<()> {
    let result = SaleRecord::delete_by_id(sale_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("sale", sale_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::purchase::create_purchase;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_sale_requires_existing_lot() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_sale(&db, new_sale(404, 1, Some(100.0))).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "purchase", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_cannot_oversell_lot() -> Result<()> {
        let db = setup_test_db().await?;
        let lot = create_purchase(&db, new_purchase("L-1", 10, Some(5000.0))).await?;

        let first = create_sale(&db, new_sale(lot.id, 6, Some(4000.0))).await?;
        let result = create_sale(&db, new_sale(lot.id, 5, Some(3000.0))).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        create_sale(&db, new_sale(lot.id, 4, Some(2600.0))).await?;

        // Editing a sale does not count its own heads twice
        update_sale(&db, first.id, new_sale(lot.id, 6, Some(4200.0))).await?;

        let by_lot = SaleFilter {
            lot_id: Some(lot.id),
            ..SaleFilter::default()
        };
        assert_eq!(count_sales(&db, by_lot).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_head_count_bounds() -> Result<()> {
        let db = setup_test_db().await?;
        let lot = create_purchase(&db, new_purchase("L-1", 10, None)).await?;

        let result = create_sale(&db, new_sale(lot.id, -1, None)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let empty = create_sale(&db, new_sale(lot.id, 0, None)).await?;
        assert_eq!(empty.head_count, 0);
        Ok(())
    }
}
