//! Shared test utilities for the feedlot backend.
//!
//! This module provides helpers for setting up test databases, input builders
//! with sensible defaults, and in-memory rows for the pure aggregation
//! functions that never touch a database.

use crate::{
    core::{
        category::NewCategory,
        cycle::NewCycle,
        expense::NewExpense,
        partner::{NewPartner, create_partner},
        pen::NewPen,
        purchase::NewPurchase,
        revenue::NewRevenue,
        sale::NewSale,
        user::{NewUser, create_user},
    },
    entities::{
        CategoryType, CycleStatus, PartnerType, PenStatus, PenType, PurchaseStatus, UserRole,
        cattle_purchase, expense, partner, revenue, user,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Active fattening pen, available.
#[must_use]
pub fn new_pen(pen_number: &str, capacity: i32) -> NewPen {
    NewPen {
        pen_number: pen_number.to_string(),
        capacity,
        status: PenStatus::Available,
        pen_type: PenType::Fattening,
        is_active: true,
    }
}

/// Purchase dated now, still negotiating, without pen, vendor or cycle.
#[must_use]
pub fn new_purchase(lot_code: &str, head_count: i32, total_value: Option<f64>) -> NewPurchase {
    NewPurchase {
        lot_code: lot_code.to_string(),
        vendor_id: None,
        pen_id: None,
        cycle_id: None,
        status: PurchaseStatus::Negotiating,
        purchase_date: Utc::now(),
        head_count,
        total_value,
    }
}

/// Sale dated now, without buyer.
#[must_use]
pub fn new_sale(lot_id: i64, head_count: i32, amount: Option<f64>) -> NewSale {
    NewSale {
        lot_id,
        buyer_id: None,
        head_count,
        amount,
        sale_date: Utc::now(),
    }
}

/// Open-ended cycle starting now.
#[must_use]
pub fn new_cycle(name: &str, status: CycleStatus) -> NewCycle {
    NewCycle {
        name: name.to_string(),
        start_date: Utc::now(),
        end_date: None,
        status,
    }
}

/// Category without icon.
#[must_use]
pub fn new_category(name: &str, category_type: CategoryType) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        category_type,
        icon: None,
    }
}

/// Unpaid expense described as "Test expense".
#[must_use]
pub fn new_expense(
    category: &str,
    total_amount: Option<f64>,
    due_date: DateTime<Utc>,
) -> NewExpense {
    NewExpense {
        description: "Test expense".to_string(),
        category: category.to_string(),
        total_amount,
        is_paid: false,
        due_date,
        payment_date: None,
        purchase_id: None,
        cycle_id: None,
    }
}

/// "Cattle Sales" revenue described as "Test revenue".
#[must_use]
pub fn new_revenue(
    total_amount: Option<f64>,
    is_received: bool,
    received_date: Option<DateTime<Utc>>,
) -> NewRevenue {
    NewRevenue {
        description: "Test revenue".to_string(),
        category: "Cattle Sales".to_string(),
        total_amount,
        is_received,
        received_date,
        sale_id: None,
        cycle_id: None,
    }
}

/// Creates an active partner without document.
pub async fn create_test_partner(
    db: &DatabaseConnection,
    name: &str,
    partner_type: PartnerType,
) -> Result<partner::Model> {
    create_partner(
        db,
        NewPartner {
            name: name.to_string(),
            partner_type,
            document: None,
            is_active: true,
        },
    )
    .await
}

/// Creates an active user. The display name is the email.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    role: UserRole,
) -> Result<user::Model> {
    create_user(
        db,
        NewUser {
            email: email.to_string(),
            name: email.to_string(),
            role,
        },
    )
    .await
}

/// Revenue row that was never stored.
#[must_use]
pub fn revenue_row(
    id: i64,
    total_amount: Option<f64>,
    is_received: bool,
    received_date: Option<DateTime<Utc>>,
) -> revenue::Model {
    revenue::Model {
        id,
        description: format!("Revenue {id}"),
        category: "Cattle Sales".to_string(),
        total_amount,
        is_received,
        received_date,
        sale_id: None,
        cycle_id: None,
    }
}

/// Expense row that was never stored. Paid rows are paid on their due date.
#[must_use]
pub fn expense_row(
    id: i64,
    total_amount: Option<f64>,
    is_paid: bool,
    due_date: DateTime<Utc>,
) -> expense::Model {
    expense::Model {
        id,
        description: format!("Expense {id}"),
        category: "Feed".to_string(),
        total_amount,
        is_paid,
        due_date,
        payment_date: is_paid.then_some(due_date),
        purchase_id: None,
        cycle_id: None,
    }
}

/// Purchase row of 10 heads that was never stored.
#[must_use]
pub fn purchase_row(
    id: i64,
    total_value: Option<f64>,
    purchase_date: DateTime<Utc>,
) -> cattle_purchase::Model {
    cattle_purchase::Model {
        id,
        lot_code: format!("L-{id:03}"),
        vendor_id: None,
        pen_id: None,
        cycle_id: None,
        status: PurchaseStatus::Negotiating,
        purchase_date,
        head_count: 10,
        total_value,
        created_at: purchase_date,
    }
}
