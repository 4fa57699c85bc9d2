//! Category entity - classification for expenses and revenues.

use super::enums::CategoryType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, also stored on expenses/revenues
    pub name: String,
    /// Expense or revenue category
    pub category_type: CategoryType,
    /// Seeded by the system rather than created by a user
    pub is_default: bool,
    /// Optional icon identifier for the frontend
    pub icon: Option<String>,
}

/// `Category` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
