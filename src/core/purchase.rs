//! Cattle purchase business logic - lots moving through the purchase pipeline.
//!
//! Pen, vendor and cycle references are checked on every write. A lot that
//! already has sales recorded against it cannot be deleted.

use super::{DateRange, Page, require_non_negative, require_text, validate_amount};
use crate::{
    entities::{CattlePurchase, PurchaseStatus, SaleRecord, cattle_purchase, sale_record},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing a purchase
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    /// Human-facing lot code
    pub lot_code: String,
    /// Selling partner
    #[serde(default)]
    pub vendor_id: Option<i64>,
    /// Allocated pen
    #[serde(default)]
    pub pen_id: Option<i64>,
    /// Attributed cycle
    #[serde(default)]
    pub cycle_id: Option<i64>,
    /// Pipeline stage, `NEGOTIATING` when omitted
    #[serde(default = "default_status")]
    pub status: PurchaseStatus,
    /// Date of the purchase order
    pub purchase_date: DateTime<Utc>,
    /// Number of animals
    pub head_count: i32,
    /// Total price
    #[serde(default)]
    pub total_value: Option<f64>,
}

const fn default_status() -> PurchaseStatus {
    PurchaseStatus::Negotiating
}

/// Optional filters for [`list_purchases`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PurchaseFilter {
    /// Window on `purchase_date`
    pub range: DateRange,
    /// Only this pipeline stage
    pub status: Option<PurchaseStatus>,
    /// Only lots in this pen
    pub pen_id: Option<i64>,
}

fn filtered(filter: PurchaseFilter) -> Select<CattlePurchase> {
    let mut select = filter
        .range
        .apply(CattlePurchase::find(), cattle_purchase::Column::PurchaseDate);
    if let Some(status) = filter.status {
        select = select.filter(cattle_purchase::Column::Status.eq(status));
    }
    if let Some(pen_id) = filter.pen_id {
        select = select.filter(cattle_purchase::Column::PenId.eq(pen_id));
    }
    select
}

async fn validate(db: &DatabaseConnection, input: &NewPurchase) -> Result<String> {
    let lot_code = require_text(&input.lot_code, "lot code")?;
    require_non_negative(input.head_count, "head count")?;
    validate_amount(input.total_value)?;

    if let Some(pen_id) = input.pen_id
        && super::pen::get_pen_by_id(db, pen_id).await?.is_none()
    {
        return Err(Error::not_found("pen", pen_id));
    }
    if let Some(vendor_id) = input.vendor_id
        && super::partner::get_partner_by_id(db, vendor_id).await?.is_none()
    {
        return Err(Error::not_found("partner", vendor_id));
    }
    if let Some(cycle_id) = input.cycle_id
        && super::cycle::get_cycle_by_id(db, cycle_id).await?.is_none()
    {
        return Err(Error::not_found("cycle", cycle_id));
    }
    Ok(lot_code)
}

async fn ensure_lot_code_free(
    db: &DatabaseConnection,
    lot_code: &str,
    except_id: Option<i64>,
) -> Result<()> {
    let existing = CattlePurchase::find()
        .filter(cattle_purchase::Column::LotCode.eq(lot_code))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except_id => Err(Error::Conflict {
            message: format!("lot code '{lot_code}' is already in use"),
        }),
        _ => Ok(()),
    }
}

/// Lists purchases, newest first.
pub async fn list_purchases(
    db: &DatabaseConnection,
    filter: PurchaseFilter,
    page: Page,
) -> Result<Vec<cattle_purchase::Model>> {
    page.apply(filtered(filter).order_by_desc(cattle_purchase::Column::PurchaseDate))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every purchase matching the filter, without pagination. Used for aggregation.
pub async fn get_all_purchases(
    db: &DatabaseConnection,
    filter: PurchaseFilter,
) -> Result<Vec<cattle_purchase::Model>> {
    filtered(filter)
        .order_by_asc(cattle_purchase::Column::PurchaseDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts purchases matching the filter.
pub async fn count_purchases(db: &DatabaseConnection, filter: PurchaseFilter) -> Result<u64> {
    filtered(filter).count(db).await.map_err(Into::into)
}

/// Finds a purchase by its unique ID.
pub async fn get_purchase_by_id(
    db: &DatabaseConnection,
    purchase_id: i64,
) -> Result<Option<cattle_purchase::Model>> {
    CattlePurchase::find_by_id(purchase_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a purchase after validating references and amounts.
pub async fn create_purchase(
    db: &DatabaseConnection,
    input: NewPurchase,
) -> Result<cattle_purchase::Model> {
    let lot_code = validate(db, &input).await?;
    ensure_lot_code_free(db, &lot_code, None).await?;

    let model = cattle_purchase::ActiveModel {
        lot_code: Set(lot_code),
        vendor_id: Set(input.vendor_id),
        pen_id: Set(input.pen_id),
        cycle_id: Set(input.cycle_id),
        status: Set(input.status),
        purchase_date: Set(input.purchase_date),
        head_count: Set(input.head_count),
        total_value: Set(input.total_value),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    tracing::info!(
        purchase_id = result.id,
        lot_code = %result.lot_code,
        status = result.status.as_str(),
        "Purchase created"
    );
    Ok(result)
}

/// Replaces every mutable field of an existing purchase.
pub async fn update_purchase(
    db: &DatabaseConnection,
    purchase_id: i64,
    input: NewPurchase,
) -> Result<cattle_purchase::Model> {
    let lot_code = validate(db, &input).await?;
    let existing = get_purchase_by_id(db, purchase_id)
        .await?
        .ok_or_else(|| Error::not_found("purchase", purchase_id))?;
    ensure_lot_code_free(db, &lot_code, Some(purchase_id)).await?;

    let sold: i64 = SaleRecord::find()
        .filter(sale_record::Column::LotId.eq(purchase_id))
        .all(db)
        .await?
        .iter()
        .map(|s| i64::from(s.head_count))
        .sum();
    if i64::from(input.head_count) < sold {
        return Err(Error::Conflict {
            message: format!(
                "lot '{}' already sold {sold} head(s), cannot lower head count to {}",
                existing.lot_code, input.head_count
            ),
        });
    }

    let mut active_model: cattle_purchase::ActiveModel = existing.into();
    active_model.lot_code = Set(lot_code);
    active_model.vendor_id = Set(input.vendor_id);
    active_model.pen_id = Set(input.pen_id);
    active_model.cycle_id = Set(input.cycle_id);
    active_model.status = Set(input.status);
    active_model.purchase_date = Set(input.purchase_date);
    active_model.head_count = Set(input.head_count);
    active_model.total_value = Set(input.total_value);

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a purchase that has no sales recorded against it.
pub async fn delete_purchase(db: &DatabaseConnection, purchase_id: i64) -> Result<()> {
    let sales = SaleRecord::find()
        .filter(sale_record::Column::LotId.eq(purchase_id))
        .count(db)
        .await?;
    if sales > 0 {
        return Err(Error::Conflict {
            message: format!("purchase {purchase_id} has {sales} sale(s) recorded"),
        });
    }

    let result = CattlePurchase::delete_by_id(purchase_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("purchase", purchase_id));
    }
    Ok(())
}
