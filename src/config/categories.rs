//! Default category configuration from config.toml
//!
//! The categories listed under `[[categories]]` are inserted by the
//! `002_seed_default_categories` migration when missing. When the file lists
//! none, a built-in feedlot chart of categories is used.

use crate::entities::CategoryType;
use serde::Deserialize;

/// Configuration for a single seeded category
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// Whether it classifies expenses or revenues
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Optional icon identifier
    #[serde(default)]
    pub icon: Option<String>,
}

impl CategoryConfig {
    fn new(name: &str, category_type: CategoryType, icon: &str) -> Self {
        Self {
            name: name.to_string(),
            category_type,
            icon: Some(icon.to_string()),
        }
    }
}

/// Built-in categories used when config.toml does not list any.
#[must_use]
pub fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("Animal Purchase", CategoryType::Expense, "cow"),
        CategoryConfig::new("Feed", CategoryType::Expense, "wheat"),
        CategoryConfig::new("Veterinary", CategoryType::Expense, "syringe"),
        CategoryConfig::new("Freight", CategoryType::Expense, "truck"),
        CategoryConfig::new("Labor", CategoryType::Expense, "users"),
        CategoryConfig::new("Maintenance", CategoryType::Expense, "wrench"),
        CategoryConfig::new("Administrative", CategoryType::Expense, "briefcase"),
        CategoryConfig::new("Cattle Sales", CategoryType::Revenue, "dollar-sign"),
        CategoryConfig::new("Other Revenue", CategoryType::Revenue, "plus-circle"),
    ]
}
