//! Financial report generation.
//!
//! This module builds the period income statement (DRE), the cash flow over a
//! date window and the per-lot profitability table. Like the rest of the
//! aggregation layer it only reads, and returns structured data that the HTTP
//! layer serializes as-is.

use super::{
    DateRange, coerce_amount,
    sum_amounts, to_amount,
    expense::{ExpenseFilter, get_all_expenses},
    purchase::{PurchaseFilter, get_all_purchases},
    revenue::{RevenueFilter, get_all_revenues},
    sale::{SaleFilter, get_all_sales},
};
use crate::{
    entities::{PurchaseStatus, cattle_purchase},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Amount booked under one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Category name as stored on the rows
    pub category: String,
    /// Sum of amounts
    pub amount: f64,
}

/// Period profit and loss statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Reporting window
    pub range: DateRangeView,
    /// Received revenues by category, sorted by name
    pub revenues_by_category: Vec<CategoryTotal>,
    /// Expenses due in the window by category, sorted by name
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Sum of received revenues
    pub gross_revenue: f64,
    /// Sum of expenses
    pub operating_expenses: f64,
    /// Value of cattle bought in the window, cancelled orders excluded
    pub purchase_costs: f64,
    /// `operating_expenses + purchase_costs`
    pub total_costs: f64,
    /// `gross_revenue - total_costs`
    pub net_result: f64,
    /// `net_result / gross_revenue` in percent, 0 without revenue
    pub margin: f64,
}

/// Realized and pending money movements in a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    /// Reporting window
    pub range: DateRangeView,
    /// Revenues received in the window
    pub realized_inflows: f64,
    /// Expenses paid in the window, by payment date
    pub realized_outflows: f64,
    /// `realized_inflows - realized_outflows`
    pub net_realized: f64,
    /// Revenues still pending whose expected date falls in the window
    pub pending_inflows: f64,
    /// Unpaid expenses due in the window
    pub pending_outflows: f64,
    /// `net_realized + pending_inflows - pending_outflows`
    pub projected_net: f64,
}

/// Profitability of one cattle lot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotProfitability {
    /// Purchase id
    pub lot_id: i64,
    /// Lot code
    pub lot_code: String,
    /// Pipeline stage
    pub status: PurchaseStatus,
    /// Price paid for the lot
    pub purchase_cost: f64,
    /// Expenses attributed to the lot
    pub attributed_expenses: f64,
    /// Revenue from sale records of the lot
    pub sales_revenue: f64,
    /// Heads bought
    pub heads_bought: i32,
    /// Heads sold so far
    pub heads_sold: i64,
    /// `sales_revenue - purchase_cost - attributed_expenses`
    pub profit: f64,
    /// `profit / sales_revenue` in percent, 0 without sales
    pub margin: f64,
}

/// Serialized form of a report window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRangeView {
    /// Lower bound (inclusive)
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    /// Upper bound (exclusive)
    pub to: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<DateRange> for DateRangeView {
    fn from(range: DateRange) -> Self {
        Self {
            from: range.from,
            to: range.to,
        }
    }
}

/// Percentage of `part` over `whole`, 0 when `whole` is 0.
#[must_use]
pub fn margin_percent(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    to_amount(part / whole * Decimal::ONE_HUNDRED)
}

fn by_category<'a, I>(rows: I) -> (Vec<CategoryTotal>, Decimal)
where
    I: IntoIterator<Item = (&'a str, Option<f64>)>,
{
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for (category, amount) in rows {
        *totals.entry(category).or_default() += coerce_amount(amount);
    }
    let sum = totals.values().copied().sum();
    let rows = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount: to_amount(amount),
        })
        .collect();
    (rows, sum)
}

/// Generates the income statement (DRE) for a window.
///
/// Revenues count when received with a `received_date` in the window. Expenses
/// count by `due_date`, paid or not. Purchase costs count by `purchase_date`.
///
/// # Arguments
/// * `db` - Database connection
/// * `range` - Reporting window
///
/// # Errors
/// Returns `Error::DataUnavailable` if any of the reads fails
pub async fn income_statement(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<IncomeStatement> {
    let revenues = get_all_revenues(
        db,
        RevenueFilter {
            range,
            is_received: Some(true),
            ..RevenueFilter::default()
        },
    )
    .await?;
    let expenses = get_all_expenses(
        db,
        ExpenseFilter {
            range,
            ..ExpenseFilter::default()
        },
    )
    .await?;
    let purchases = get_all_purchases(
        db,
        PurchaseFilter {
            range,
            ..PurchaseFilter::default()
        },
    )
    .await?;

    let (revenues_by_category, gross_revenue) = by_category(
        revenues
            .iter()
            .map(|r| (r.category.as_str(), r.total_amount)),
    );
    let (expenses_by_category, operating_expenses) = by_category(
        expenses
            .iter()
            .map(|e| (e.category.as_str(), e.total_amount)),
    );

    let purchase_costs = sum_amounts(
        purchases
            .iter()
            .filter(|p| p.status != PurchaseStatus::Cancelled)
            .map(|p| p.total_value),
    );
    let total_costs = operating_expenses + purchase_costs;
    let net_result = gross_revenue - total_costs;

    Ok(IncomeStatement {
        range: range.into(),
        revenues_by_category,
        expenses_by_category,
        gross_revenue: to_amount(gross_revenue),
        operating_expenses: to_amount(operating_expenses),
        purchase_costs: to_amount(purchase_costs),
        total_costs: to_amount(total_costs),
        net_result: to_amount(net_result),
        margin: margin_percent(net_result, gross_revenue),
    })
}

/// Generates the cash flow for a window.
///
/// # Errors
/// Returns `Error::DataUnavailable` if any of the reads fails
pub async fn cash_flow(db: &DatabaseConnection, range: DateRange) -> Result<CashFlow> {
    let revenues = get_all_revenues(
        db,
        RevenueFilter {
            range,
            ..RevenueFilter::default()
        },
    )
    .await?;
    // Paid expenses are placed by payment date, which the filter cannot express.
    let expenses = get_all_expenses(db, ExpenseFilter::default()).await?;

    let realized_inflows = sum_amounts(
        revenues
            .iter()
            .filter(|row| row.is_received)
            .map(|row| row.total_amount),
    );
    let pending_inflows = sum_amounts(
        revenues
            .iter()
            .filter(|row| !row.is_received)
            .map(|row| row.total_amount),
    );
    let realized_outflows = sum_amounts(
        expenses
            .iter()
            .filter(|row| row.is_paid && row.payment_date.is_some_and(|paid| range.contains(paid)))
            .map(|row| row.total_amount),
    );
    let pending_outflows = sum_amounts(
        expenses
            .iter()
            .filter(|row| !row.is_paid && range.contains(row.due_date))
            .map(|row| row.total_amount),
    );
    let net_realized = realized_inflows - realized_outflows;

    Ok(CashFlow {
        range: range.into(),
        realized_inflows: to_amount(realized_inflows),
        realized_outflows: to_amount(realized_outflows),
        net_realized: to_amount(net_realized),
        pending_inflows: to_amount(pending_inflows),
        pending_outflows: to_amount(pending_outflows),
        projected_net: to_amount(net_realized + pending_inflows - pending_outflows),
    })
}

/// Profitability of every lot, ordered by lot code.
///
/// # Errors
/// Returns `Error::DataUnavailable` if any of the reads fails
pub async fn lot_profitability(db: &DatabaseConnection) -> Result<Vec<LotProfitability>> {
    let mut purchases = get_all_purchases(db, PurchaseFilter::default()).await?;
    let expenses = get_all_expenses(db, ExpenseFilter::default()).await?;
    let sales = get_all_sales(db, SaleFilter::default()).await?;

    let mut expenses_by_lot: HashMap<i64, Decimal> = HashMap::new();
    for row in &expenses {
        if let Some(lot_id) = row.purchase_id {
            *expenses_by_lot.entry(lot_id).or_default() += coerce_amount(row.total_amount);
        }
    }
    let mut sales_by_lot: HashMap<i64, (Decimal, i64)> = HashMap::new();
    for row in &sales {
        let entry = sales_by_lot.entry(row.lot_id).or_default();
        entry.0 += coerce_amount(row.amount);
        entry.1 += i64::from(row.head_count);
    }

    purchases.sort_by(|a, b| a.lot_code.cmp(&b.lot_code));
    Ok(purchases
        .into_iter()
        .map(|lot| lot_row(lot, &expenses_by_lot, &sales_by_lot))
        .collect())
}

fn lot_row(
    lot: cattle_purchase::Model,
    expenses_by_lot: &HashMap<i64, Decimal>,
    sales_by_lot: &HashMap<i64, (Decimal, i64)>,
) -> LotProfitability {
    let purchase_cost = coerce_amount(lot.total_value);
    let attributed_expenses = expenses_by_lot.get(&lot.id).copied().unwrap_or_default();
    let (sales_revenue, heads_sold) = sales_by_lot.get(&lot.id).copied().unwrap_or_default();
    let profit = sales_revenue - purchase_cost - attributed_expenses;

    LotProfitability {
        lot_id: lot.id,
        lot_code: lot.lot_code,
        status: lot.status,
        purchase_cost: to_amount(purchase_cost),
        attributed_expenses: to_amount(attributed_expenses),
        sales_revenue: to_amount(sales_revenue),
        heads_bought: lot.head_count,
        heads_sold,
        profit: to_amount(profit),
        margin: margin_percent(profit, sales_revenue),
    }
}
