//! Bearer-token authentication middleware.

use super::{AppState, error::ApiError};
use crate::{
    core::user::get_user_by_token,
    entities::{UserRole, user},
    errors::Error,
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, header},
    middleware::Next,
    response::Response,
};
use sea_orm::ActiveEnum;
use serde::Serialize;
use tracing::debug;

/// Caller identity attached to every authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// User id; `None` when auth is disabled
    pub id: Option<i64>,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: UserRole,
}

impl CurrentUser {
    /// Identity used for every request while auth is disabled.
    #[must_use]
    pub fn local_admin() -> Self {
        Self {
            id: None,
            email: "local@localhost".to_string(),
            name: "Local administrator".to_string(),
            role: UserRole::Admin,
        }
    }

    /// Fails with `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(Error::Forbidden {
                message: "administrator role required".to_string(),
            })
        }
    }
}

impl From<user::Model> for CurrentUser {
    fn from(user: user::Model) -> Self {
        Self {
            id: Some(user.id),
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn is_write(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Resolves the caller, enforces read/write permissions and stores a
/// [`CurrentUser`] in the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = if state.auth.enabled {
        let token = bearer_token(request.headers()).ok_or_else(|| Error::Unauthorized {
            message: "missing bearer token".to_string(),
        })?;
        let user = get_user_by_token(&state.db, token)
            .await?
            .ok_or_else(|| Error::Unauthorized {
                message: "unknown or inactive token".to_string(),
            })?;
        CurrentUser::from(user)
    } else {
        CurrentUser::local_admin()
    };

    if is_write(request.method()) && !caller.role.can_write() {
        return Err(Error::Forbidden {
            message: format!("{} users cannot modify data", caller.role.to_value()),
        }
        .into());
    }

    debug!(
        email = %caller.email,
        method = %request.method(),
        path = %request.uri().path(),
        "Request authenticated"
    );
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
