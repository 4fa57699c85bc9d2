//! Cycle entity - a bounded production period.

use super::enums::CycleStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cycle database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cycles")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g. `"Dry season 2024"`)
    pub name: String,
    /// First day of the cycle
    pub start_date: DateTimeUtc,
    /// Last day, `None` while open-ended
    pub end_date: Option<DateTimeUtc>,
    /// Lifecycle state
    pub status: CycleStatus,
}

/// Cycles are only referenced, they reference nothing
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
