//! Active enums shared by the entity definitions.
//!
//! All enums are stored as upper-snake strings so that rows written by older
//! tooling stay readable once the migrations have normalized them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pipeline stage of a cattle purchase
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    /// Price still being negotiated with the vendor
    #[sea_orm(string_value = "NEGOTIATING")]
    Negotiating,
    /// Paid, awaiting shipment
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// On the truck
    #[sea_orm(string_value = "IN_TRANSIT")]
    InTransit,
    /// Unloaded at the reception pens
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    /// Allocated to a pen and being fattened
    #[sea_orm(string_value = "CONFINED")]
    Confined,
    /// Lot sold
    #[sea_orm(string_value = "SOLD")]
    Sold,
    /// Order cancelled
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl PurchaseStatus {
    /// Whether the lot is still in the operational pipeline.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Sold | Self::Cancelled)
    }

    /// Upper-snake name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negotiating => "NEGOTIATING",
            Self::Paid => "PAID",
            Self::InTransit => "IN_TRANSIT",
            Self::Received => "RECEIVED",
            Self::Confined => "CONFINED",
            Self::Sold => "SOLD",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Operational state of a pen
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PenStatus {
    /// Empty and ready
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    /// Holding animals
    #[sea_orm(string_value = "OCCUPIED")]
    Occupied,
    /// Closed for repairs
    #[sea_orm(string_value = "MAINTENANCE")]
    Maintenance,
    /// Isolated for sanitary reasons
    #[sea_orm(string_value = "QUARANTINE")]
    Quarantine,
}

/// Purpose of a pen
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PenType {
    /// Arrival pens
    #[sea_orm(string_value = "RECEPTION")]
    Reception,
    /// Main feeding pens
    #[sea_orm(string_value = "FATTENING")]
    Fattening,
    /// Isolation pens
    #[sea_orm(string_value = "QUARANTINE")]
    Quarantine,
    /// Sick pens
    #[sea_orm(string_value = "HOSPITAL")]
    Hospital,
}

/// Lifecycle of a production cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    /// Not started yet
    #[sea_orm(string_value = "PLANNED")]
    Planned,
    /// Current cycle
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Closed
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Abandoned
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Whether a category classifies expenses or revenues
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    /// Expense category
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
    /// Revenue category
    #[sea_orm(string_value = "REVENUE")]
    Revenue,
}

/// Role a partner plays in the operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerType {
    /// Sells cattle to the feedlot
    #[sea_orm(string_value = "VENDOR")]
    Vendor,
    /// Buys finished cattle
    #[sea_orm(string_value = "BUYER")]
    Buyer,
    /// Intermediary
    #[sea_orm(string_value = "BROKER")]
    Broker,
    /// Livestock transport
    #[sea_orm(string_value = "FREIGHT")]
    Freight,
    /// Anything else
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Access level of an API user
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full access including user management
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Read and write operational data
    #[sea_orm(string_value = "MANAGER")]
    Manager,
    /// Read only
    #[sea_orm(string_value = "VIEWER")]
    Viewer,
}

impl UserRole {
    /// Whether this role may create, update or delete data.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}
