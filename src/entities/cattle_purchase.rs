//! Cattle purchase entity - one row per lot bought.
//!
//! A purchase moves through the `PurchaseStatus` pipeline from negotiation to
//! confinement and finally sale. Confined lots count towards the occupancy of
//! the pen they are allocated to.

use super::enums::PurchaseStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cattle purchase database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cattle_purchases")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing lot code (e.g. `"L-2024-013"`)
    #[sea_orm(unique)]
    pub lot_code: String,
    /// Selling partner
    pub vendor_id: Option<i64>,
    /// Pen the lot is allocated to
    pub pen_id: Option<i64>,
    /// Cycle the purchase is attributed to
    pub cycle_id: Option<i64>,
    /// Pipeline stage
    pub status: PurchaseStatus,
    /// Date of the purchase order
    pub purchase_date: DateTimeUtc,
    /// Number of animals in the lot
    pub head_count: i32,
    /// Total price paid; may be missing on older rows
    pub total_value: Option<f64>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between purchases and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Vendor the lot was bought from
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::VendorId",
        to = "super::partner::Column::Id",
        on_delete = "SetNull"
    )]
    Vendor,
    /// Pen holding the lot
    #[sea_orm(
        belongs_to = "super::pen::Entity",
        from = "Column::PenId",
        to = "super::pen::Column::Id",
        on_delete = "SetNull"
    )]
    Pen,
    /// Cycle the lot belongs to
    #[sea_orm(
        belongs_to = "super::cycle::Entity",
        from = "Column::CycleId",
        to = "super::cycle::Column::Id",
        on_delete = "SetNull"
    )]
    Cycle,
    /// Sales of this lot
    #[sea_orm(has_many = "super::sale_record::Entity")]
    Sales,
}

impl Related<super::pen::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pen.def()
    }
}

impl Related<super::sale_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
