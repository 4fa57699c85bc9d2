//! Core business logic - framework-agnostic data access, aggregation and reporting.
//!
//! The per-entity modules are the data access layer: plain async functions over a
//! `SeaORM` connection. `dashboard`, `stats`, `charts`, `alerts` and `report` form
//! the aggregation layer and only ever read.

pub mod alerts;
pub mod category;
pub mod charts;
pub mod cycle;
pub mod dashboard;
pub mod expense;
pub mod migrations;
pub mod partner;
pub mod pen;
pub mod purchase;
pub mod report;
pub mod revenue;
pub mod sale;
pub mod stats;
pub mod user;

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Select};
use serde::Deserialize;

/// Rows returned by a list call when the caller does not ask for a limit.
pub const DEFAULT_PAGE_SIZE: u64 = 100;
/// Hard cap on rows returned by a single list call.
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Half-open date window: `from` inclusive, `to` exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    /// Lower bound (inclusive)
    pub from: Option<DateTime<Utc>>,
    /// Upper bound (exclusive)
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Window between two instants.
    #[must_use]
    pub const fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Whether `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at < to)
    }

    /// Adds the window as predicates on `column`.
    #[must_use]
    pub fn apply<S, C>(self, mut select: S, column: C) -> S
    where
        S: QueryFilter,
        C: ColumnTrait,
    {
        if let Some(from) = self.from {
            select = select.filter(column.gte(from));
        }
        if let Some(to) = self.to {
            select = select.filter(column.lt(to));
        }
        select
    }
}

/// Limit/offset pagination for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Page {
    /// Maximum rows, clamped to [`MAX_PAGE_SIZE`]
    pub limit: Option<u64>,
    /// Rows to skip
    pub offset: Option<u64>,
}

impl Page {
    /// Effective row limit.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Applies limit and offset to a select.
    #[must_use]
    pub fn apply<E: EntityTrait>(self, select: Select<E>) -> Select<E> {
        select.limit(self.limit()).offset(self.offset.unwrap_or(0))
    }
}

/// Exact decimal value of a stored amount. Missing, non-finite or
/// unrepresentable amounts count as zero.
///
/// Every monetary sum in the aggregation layer goes through this, so totals
/// do not depend on the order rows come back in.
#[must_use]
pub fn coerce_amount(amount: Option<f64>) -> Decimal {
    amount
        .filter(|value| value.is_finite())
        .and_then(Decimal::from_f64)
        .unwrap_or(Decimal::ZERO)
}

/// Sums amounts after coercing each one.
pub fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Option<f64>>,
{
    amounts.into_iter().map(coerce_amount).sum()
}

/// Converts a decimal total to the number carried in responses.
#[must_use]
pub fn to_amount(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Rejects negative or non-finite amounts. `None` is accepted.
pub fn validate_amount(amount: Option<f64>) -> Result<()> {
    match amount {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(Error::InvalidAmount { amount: value })
        }
        _ => Ok(()),
    }
}

/// Trims `value` and rejects it when empty.
pub fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Rejects negative counts.
pub fn require_non_negative(value: i32, field: &str) -> Result<()> {
    if value < 0 {
        return Err(Error::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}
