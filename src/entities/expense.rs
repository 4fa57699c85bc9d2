//! Expense entity - a payable, optionally attributed to a lot or cycle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What was bought
    pub description: String,
    /// Category name (see the `categories` table)
    pub category: String,
    /// Amount owed; may be missing on imported rows
    pub total_amount: Option<f64>,
    /// Whether the expense has been settled
    pub is_paid: bool,
    /// When payment is due
    pub due_date: DateTimeUtc,
    /// When it was actually paid
    pub payment_date: Option<DateTimeUtc>,
    /// Lot the cost is attributed to
    pub purchase_id: Option<i64>,
    /// Cycle the cost is attributed to
    pub cycle_id: Option<i64>,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Lot this expense is attributed to
    #[sea_orm(
        belongs_to = "super::cattle_purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::cattle_purchase::Column::Id",
        on_delete = "SetNull"
    )]
    Purchase,
    /// Cycle this expense is attributed to
    #[sea_orm(
        belongs_to = "super::cycle::Entity",
        from = "Column::CycleId",
        to = "super::cycle::Column::Id",
        on_delete = "SetNull"
    )]
    Cycle,
}

impl ActiveModelBehavior for ActiveModel {}
