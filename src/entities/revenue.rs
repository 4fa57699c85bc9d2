//! Revenue entity - a receivable, usually generated by a sale.
//!
//! `received_date` doubles as the expected receipt date while the revenue is
//! pending, which is what makes the overdue predicate possible.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Revenue database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenues")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What the money is for
    pub description: String,
    /// Category name (see the `categories` table)
    pub category: String,
    /// Amount receivable; may be missing on imported rows
    pub total_amount: Option<f64>,
    /// Whether the money has arrived
    pub is_received: bool,
    /// Expected (pending) or actual (received) receipt date
    pub received_date: Option<DateTimeUtc>,
    /// Sale that generated this revenue
    pub sale_id: Option<i64>,
    /// Cycle the revenue is attributed to
    pub cycle_id: Option<i64>,
}

/// Defines relationships between Revenue and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Originating sale
    #[sea_orm(
        belongs_to = "super::sale_record::Entity",
        from = "Column::SaleId",
        to = "super::sale_record::Column::Id",
        on_delete = "SetNull"
    )]
    Sale,
    /// Cycle this revenue is attributed to
    #[sea_orm(
        belongs_to = "super::cycle::Entity",
        from = "Column::CycleId",
        to = "super::cycle::Column::Id",
        on_delete = "SetNull"
    )]
    Cycle,
}

impl ActiveModelBehavior for ActiveModel {}
