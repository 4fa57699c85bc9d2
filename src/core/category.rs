//! Category business logic - expense and revenue classification.
//!
//! Names are compared case-insensitively within a category type, matching how
//! the unification migration merges legacy duplicates. Seeded (default)
//! categories cannot be deleted.

use super::{Page, require_text};
use crate::{
    entities::{Category, CategoryType, category},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, prelude::*};
use serde::Deserialize;

/// Input for creating or replacing a category
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// Display name
    pub name: String,
    /// Expense or revenue
    pub category_type: CategoryType,
    /// Optional icon identifier
    #[serde(default)]
    pub icon: Option<String>,
}

/// Normalized form used to compare category names.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn filtered(category_type: Option<CategoryType>) -> Select<Category> {
    let mut select = Category::find();
    if let Some(category_type) = category_type {
        select = select.filter(category::Column::CategoryType.eq(category_type));
    }
    select
}

/// Lists categories ordered by type then name.
pub async fn list_categories(
    db: &DatabaseConnection,
    category_type: Option<CategoryType>,
    page: Page,
) -> Result<Vec<category::Model>> {
    let select = filtered(category_type)
        .order_by_asc(category::Column::CategoryType)
        .order_by_asc(category::Column::Name);
    page.apply(select).all(db).await.map_err(Into::into)
}

/// Counts categories, optionally of one type.
pub async fn count_categories(
    db: &DatabaseConnection,
    category_type: Option<CategoryType>,
) -> Result<u64> {
    filtered(category_type).count(db).await.map_err(Into::into)
}

/// Finds a category by its unique ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id).one(db).await.map_err(Into::into)
}

/// Finds a category of the given type whose name matches case-insensitively.
pub async fn find_category_by_name<C>(
    db: &C,
    name: &str,
    category_type: CategoryType,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    let wanted = normalize_name(name);
    let candidates = Category::find()
        .filter(category::Column::CategoryType.eq(category_type))
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?;
    Ok(candidates
        .into_iter()
        .find(|c| normalize_name(&c.name) == wanted))
}

/// Inserts a category row. `is_default` marks seeded categories.
pub async fn insert_category<C>(
    db: &C,
    input: NewCategory,
    is_default: bool,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let name = require_text(&input.name, "category name")?;
    if let Some(existing) = find_category_by_name(db, &name, input.category_type).await? {
        return Err(Error::Conflict {
            message: format!("category '{}' already exists", existing.name),
        });
    }

    let model = category::ActiveModel {
        name: Set(name),
        category_type: Set(input.category_type),
        is_default: Set(is_default),
        icon: Set(input.icon),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Creates a user-defined category.
pub async fn create_category(
    db: &DatabaseConnection,
    input: NewCategory,
) -> Result<category::Model> {
    insert_category(db, input, false).await
}

/// Replaces name, type and icon of an existing category.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    input: NewCategory,
) -> Result<category::Model> {
    let name = require_text(&input.name, "category name")?;
    let existing = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found("category", category_id))?;
    if let Some(other) = find_category_by_name(db, &name, input.category_type).await?
        && other.id != category_id
    {
        return Err(Error::Conflict {
            message: format!("category '{}' already exists", other.name),
        });
    }

    let mut active_model: category::ActiveModel = existing.into();
    active_model.name = Set(name);
    active_model.category_type = Set(input.category_type);
    active_model.icon = Set(input.icon);

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a user-defined category.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let existing = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found("category", category_id))?;
    if existing.is_default {
        return Err(Error::Conflict {
            message: format!("default category '{}' cannot be deleted", existing.name),
        });
    }
    Category::delete_by_id(category_id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Animal   Purchase "), "animal purchase");
        assert_eq!(normalize_name("FEED"), normalize_name("feed"));
    }

    #[tokio::test]
    async fn test_duplicate_names_conflict_per_type() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, new_category("Feed", CategoryType::Expense)).await?;

        let result = create_category(&db, new_category(" feed ", CategoryType::Expense)).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        // Same name under the other type is allowed
        create_category(&db, new_category("Feed", CategoryType::Revenue)).await?;
        assert_eq!(list_categories(&db, None, Page::default()).await?.len(), 2);
        assert_eq!(count_categories(&db, Some(CategoryType::Revenue)).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_default_category_cannot_be_deleted() -> Result<()> {
        let db = setup_test_db().await?;
        let seeded = insert_category(&db, new_category("Feed", CategoryType::Expense), true).await?;
        let custom = create_category(&db, new_category("Tools", CategoryType::Expense)).await?;

        let result = delete_category(&db, seeded.id).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        delete_category(&db, custom.id).await?;
        assert!(get_category_by_id(&db, custom.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_to_existing_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, new_category("Feed", CategoryType::Expense)).await?;
        let tools = create_category(&db, new_category("Tools", CategoryType::Expense)).await?;

        let result =
            update_category(&db, tools.id, new_category("FEED", CategoryType::Expense)).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        let renamed =
            update_category(&db, tools.id, new_category("Equipment", CategoryType::Expense)).await?;
        assert_eq!(renamed.name, "Equipment");
        Ok(())
    }
}
