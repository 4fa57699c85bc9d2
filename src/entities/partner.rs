//! Partner entity - vendors, buyers, brokers and carriers.

use super::enums::PartnerType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trading name
    pub name: String,
    /// Role in the operation
    pub partner_type: PartnerType,
    /// Tax document number
    pub document: Option<String>,
    /// Inactive partners are hidden from pickers
    pub is_active: bool,
}

/// `Partner` is only referenced, it references nothing
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
