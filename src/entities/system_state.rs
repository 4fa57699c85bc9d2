//! System state entity - key/value bookkeeping rows.
//!
//! The migration runner records each applied step here under
//! `migration:<version>`, with the time it was applied as the value.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One bookkeeping entry
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Row id
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Ledger key, e.g. `"migration:003_normalize_purchase_status"`
    #[sea_orm(unique)]
    pub key: String,
    /// RFC 3339 timestamp for migration keys
    pub value: String,
    /// Last write
    pub updated_at: DateTime,
}

/// No relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
