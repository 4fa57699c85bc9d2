//! Sale record entity - heads sold out of a lot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_records")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lot (cattle purchase) the animals came from
    pub lot_id: i64,
    /// Buying partner
    pub buyer_id: Option<i64>,
    /// Number of animals sold
    pub head_count: i32,
    /// Sale amount; may be missing on imported rows
    pub amount: Option<f64>,
    /// When the sale happened
    pub sale_date: DateTimeUtc,
}

/// Defines relationships between `SaleRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one lot
    #[sea_orm(
        belongs_to = "super::cattle_purchase::Entity",
        from = "Column::LotId",
        to = "super::cattle_purchase::Column::Id",
        on_delete = "Restrict"
    )]
    Lot,
    /// Buyer of the animals
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::BuyerId",
        to = "super::partner::Column::Id",
        on_delete = "SetNull"
    )]
    Buyer,
}

impl Related<super::cattle_purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
