//! Pen entity - a physical enclosure with a finite head capacity.

use super::enums::{PenStatus, PenType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pen database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pens")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Painted pen number, unique across the feedlot
    #[sea_orm(unique)]
    pub pen_number: String,
    /// Maximum number of animals
    pub capacity: i32,
    /// Operational state
    pub status: PenStatus,
    /// Purpose of the pen
    pub pen_type: PenType,
    /// Inactive pens are excluded from capacity totals
    pub is_active: bool,
}

/// One pen holds many lots
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Lots allocated to this pen
    #[sea_orm(has_many = "super::cattle_purchase::Entity")]
    Purchases,
}

impl Related<super::cattle_purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
