//! User business logic - API principals and their bearer tokens.

use super::require_text;
use crate::{
    entities::{User, UserRole, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use uuid::Uuid;

/// Input for creating a user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: UserRole,
}

/// Generates a fresh opaque bearer token.
#[must_use]
pub fn generate_token() -> String {
    format!("flt_{}", Uuid::new_v4().simple())
}

/// Lists users ordered by email.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Email)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Resolves an active user from a bearer token.
pub async fn get_user_by_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::ApiToken.eq(token))
        .filter(user::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a user with a newly generated token. The token is only readable
/// from the returned model.
pub async fn create_user(db: &DatabaseConnection, input: NewUser) -> Result<user::Model> {
    let email = require_text(&input.email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(Error::validation(format!("'{email}' is not an email address")));
    }
    let name = require_text(&input.name, "name")?;

    let taken = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::Conflict {
            message: format!("user '{email}' already exists"),
        });
    }

    let model = user::ActiveModel {
        email: Set(email),
        name: Set(name),
        role: Set(input.role),
        api_token: Set(generate_token()),
        is_active: Set(true),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    tracing::info!(user_id = result.id, role = ?result.role, "User created");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
        assert!(generate_token().starts_with("flt_"));
    }

    #[tokio::test]
    async fn test_lookup_by_token() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Ops@Feedlot.test", UserRole::Manager).await?;
        assert_eq!(user.email, "ops@feedlot.test");

        let found = get_user_by_token(&db, &user.api_token).await?;
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(get_user_by_token(&db, "flt_unknown").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "ops@feedlot.test", UserRole::Viewer).await?;
        let result = create_test_user(&db, "OPS@feedlot.test", UserRole::Admin).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_email() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_test_user(&db, "not-an-email", UserRole::Viewer).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
