//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod cattle_purchase;
pub mod cycle;
pub mod enums;
pub mod expense;
pub mod partner;
pub mod pen;
pub mod revenue;
pub mod sale_record;
pub mod system_state;
pub mod user;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use cattle_purchase::{
    Column as CattlePurchaseColumn, Entity as CattlePurchase, Model as CattlePurchaseModel,
};
pub use cycle::{Column as CycleColumn, Entity as Cycle, Model as CycleModel};
pub use enums::{
    CategoryType, CycleStatus, PartnerType, PenStatus, PenType, PurchaseStatus, UserRole,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use partner::{Column as PartnerColumn, Entity as Partner, Model as PartnerModel};
pub use pen::{Column as PenColumn, Entity as Pen, Model as PenModel};
pub use revenue::{Column as RevenueColumn, Entity as Revenue, Model as RevenueModel};
pub use sale_record::{Column as SaleRecordColumn, Entity as SaleRecord, Model as SaleRecordModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
