//! Expense business logic - payables and their settlement.
//!
//! An expense marked paid without a payment date is stamped with the time of
//! the write, so cash-flow reports always have a date to bucket it by.

use super::{DateRange, Page, require_text, validate_amount};
use crate::{
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing an expense
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// What was bought
    pub description: String,
    /// Category name
    pub category: String,
    /// Amount owed
    #[serde(default)]
    pub total_amount: Option<f64>,
    /// Already settled
    #[serde(default)]
    pub is_paid: bool,
    /// When payment is due
    pub due_date: DateTime<Utc>,
    /// When it was paid
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    /// Lot the cost is attributed to
    #[serde(default)]
    pub purchase_id: Option<i64>,
    /// Cycle the cost is attributed to
    #[serde(default)]
    pub cycle_id: Option<i64>,
}

/// Optional filters for [`list_expenses`]
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Window on `due_date`
    pub range: DateRange,
    /// Only paid (or unpaid) expenses
    pub is_paid: Option<bool>,
    /// Only this category name
    pub category: Option<String>,
    /// Only costs attributed to this lot
    pub purchase_id: Option<i64>,
}

fn filtered(filter: ExpenseFilter) -> Select<Expense> {
    let mut select = filter.range.apply(Expense::find(), expense::Column::DueDate);
    if let Some(paid) = filter.is_paid {
        select = select.filter(expense::Column::IsPaid.eq(paid));
    }
    if let Some(category) = filter.category {
        select = select.filter(expense::Column::Category.eq(category));
    }
    if let Some(purchase_id) = filter.purchase_id {
        select = select.filter(expense::Column::PurchaseId.eq(purchase_id));
    }
    select
}

struct Checked {
    description: String,
    category: String,
    payment_date: Option<DateTime<Utc>>,
}

async fn validate(db: &DatabaseConnection, input: &NewExpense) -> Result<Checked> {
    let description = require_text(&input.description, "description")?;
    let category = require_text(&input.category, "category")?;
    validate_amount(input.total_amount)?;

    if let Some(purchase_id) = input.purchase_id
        && super::purchase::get_purchase_by_id(db, purchase_id).await?.is_none()
    {
        return Err(Error::not_found("purchase", purchase_id));
    }
    if let Some(cycle_id) = input.cycle_id
        && super::cycle::get_cycle_by_id(db, cycle_id).await?.is_none()
    {
        return Err(Error::not_found("cycle", cycle_id));
    }

    let payment_date = if input.is_paid {
        Some(input.payment_date.unwrap_or_else(Utc::now))
    } else {
        None
    };
    Ok(Checked {
        description,
        category,
        payment_date,
    })
}

/// Lists expenses by due date, soonest first.
pub async fn list_expenses(
    db: &DatabaseConnection,
    filter: ExpenseFilter,
    page: Page,
) -> Result<Vec<expense::Model>> {
    page.apply(filtered(filter).order_by_asc(expense::Column::DueDate))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every expense matching the filter, without pagination. Used for aggregation.
pub async fn get_all_expenses(
    db: &DatabaseConnection,
    filter: ExpenseFilter,
) -> Result<Vec<expense::Model>> {
    filtered(filter)
        .order_by_asc(expense::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts expenses matching the filter.
pub async fn count_expenses(db: &DatabaseConnection, filter: ExpenseFilter) -> Result<u64> {
    filtered(filter).count(db).await.map_err(Into::into)
}

/// Finds an expense by its unique ID.
pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id).one(db).await.map_err(Into::into)
}

/// Creates an expense.
pub async fn create_expense(db: &DatabaseConnection, input: NewExpense) -> Result<expense::Model> {
    let checked = validate(db, &input).await?;

    let model = expense::ActiveModel {
        description: Set(checked.description),
        category: Set(checked.category),
        total_amount: Set(input.total_amount),
        is_paid: Set(input.is_paid),
        due_date: Set(input.due_date),
        payment_date: Set(checked.payment_date),
        purchase_id: Set(input.purchase_id),
        cycle_id: Set(input.cycle_id),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Replaces every mutable field of an existing expense.
pub async fn update_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    input: NewExpense,
) -> Result<expense::Model> {
    let checked = validate(db, &input).await?;
    let existing = get_expense_by_id(db, expense_id)
        .await?
        .ok_or_else(|| Error::not_found("expense", expense_id))?;

    let mut active_model: expense::ActiveModel = existing.into();
    active_model.description = Set(checked.description);
    active_model.category = Set(checked.category);
    active_model.total_amount = Set(input.total_amount);
    active_model.is_paid = Set(input.is_paid);
    active_model.due_date = Set(input.due_date);
    active_model.payment_date = Set(checked.payment_date);
    active_model.purchase_id = Set(input.purchase_id);
    active_model.cycle_id = Set(input.cycle_id);

    active_model.update(db).await.map_err(Into::into)
}

/// Marks an expense as paid at `paid_at`.
pub async fn mark_expense_paid(
    db: &DatabaseConnection,
    expense_id: i64,
    paid_at: DateTime<Utc>,
) -> Result<expense::Model> {
    let existing = get_expense_by_id(db, expense_id)
        .await?
        .ok_or_else(|| Error::not_found("expense", expense_id))?;
    if existing.is_paid {
        return Err(Error::Conflict {
            message: format!("expense {expense_id} is already paid"),
        });
    }

    let mut active_model: expense::ActiveModel = existing.into();
    active_model.is_paid = Set(true);
    active_model.payment_date = Set(Some(paid_at));
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes an expense.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    let result = Expense::delete_by_id(expense_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("expense", expense_id));
    }
    Ok(())
}
