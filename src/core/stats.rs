//! Statistics reducers for revenues and expenses.
//!
//! Each reducer is a single pass over rows already fetched from storage. Amounts
//! go through [`sum_amounts`](super::sum_amounts), so a missing or non-numeric
//! amount counts as zero
//! and never fails the fold.

use super::{expense::ExpenseFilter, revenue::RevenueFilter, sum_amounts, to_amount};
use crate::{
    entities::{expense, revenue},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Summary of a revenue collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStats {
    /// Number of rows
    pub total: u64,
    /// Sum of all amounts
    pub total_amount: f64,
    /// Rows already received
    pub received: u64,
    /// Rows not received (`total - received`)
    pub pending: u64,
    /// Pending rows whose expected date has passed
    pub overdue: u64,
}

/// Summary of an expense collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    /// Number of rows
    pub total: u64,
    /// Sum of all amounts
    pub total_amount: f64,
    /// Rows already paid
    pub paid: u64,
    /// Rows not paid (`total - paid`)
    pub pending: u64,
    /// Unpaid rows past their due date
    pub overdue: u64,
    /// Sum of paid amounts
    pub paid_amount: f64,
    /// Sum of unpaid amounts
    pub pending_amount: f64,
}

/// Whether a revenue is pending with an expected date before `now`.
#[must_use]
pub fn is_revenue_overdue(row: &revenue::Model, now: DateTime<Utc>) -> bool {
    !row.is_received && row.received_date.is_some_and(|date| date < now)
}

/// Whether an expense is unpaid past its due date.
#[must_use]
pub fn is_expense_overdue(row: &expense::Model, now: DateTime<Utc>) -> bool {
    !row.is_paid && row.due_date < now
}

/// Folds revenue rows into [`RevenueStats`].
#[must_use]
pub fn revenue_stats(rows: &[revenue::Model], now: DateTime<Utc>) -> RevenueStats {
    let total = rows.len() as u64;
    let received = rows.iter().filter(|row| row.is_received).count() as u64;
    let overdue = rows
        .iter()
        .filter(|row| is_revenue_overdue(row, now))
        .count() as u64;

    RevenueStats {
        total,
        total_amount: to_amount(sum_amounts(rows.iter().map(|row| row.total_amount))),
        received,
        pending: total - received,
        overdue,
    }
}

/// Folds expense rows into [`ExpenseStats`].
#[must_use]
pub fn expense_stats(rows: &[expense::Model], now: DateTime<Utc>) -> ExpenseStats {
    let (paid, unpaid): (Vec<&expense::Model>, Vec<&expense::Model>) =
        rows.iter().partition(|row| row.is_paid);
    let paid_amount = sum_amounts(paid.iter().map(|row| row.total_amount));
    let pending_amount = sum_amounts(unpaid.iter().map(|row| row.total_amount));
    let overdue = unpaid
        .iter()
        .filter(|row| is_expense_overdue(row, now))
        .count() as u64;

    ExpenseStats {
        total: rows.len() as u64,
        total_amount: to_amount(paid_amount + pending_amount),
        paid: paid.len() as u64,
        pending: unpaid.len() as u64,
        overdue,
        paid_amount: to_amount(paid_amount),
        pending_amount: to_amount(pending_amount),
    }
}

/// Statistics over every revenue in storage.
pub async fn get_revenue_stats(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<RevenueStats> {
    let rows = super::revenue::get_all_revenues(db, RevenueFilter::default()).await?;
    Ok(revenue_stats(&rows, now))
}

/// Statistics over every expense in storage.
pub async fn get_expense_stats(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<ExpenseStats> {
    let rows = super::expense::get_all_expenses(db, ExpenseFilter::default()).await?;
    Ok(expense_stats(&rows, now))
}
