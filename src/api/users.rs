//! User endpoints.

use super::{ApiJson, ApiResponse, AppState, auth::CurrentUser, error::ApiError, success};
use crate::{
    core::user::{self, NewUser},
    entities::user as user_entity,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use tracing::info;

type Reply<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Routes under `/users`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(me))
}

/// A freshly created user together with its bearer token, which is not
/// returned by any other endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedUser {
    #[serde(flatten)]
    user: user_entity::Model,
    api_token: String,
}

async fn me(Extension(caller): Extension<CurrentUser>) -> Reply<CurrentUser> {
    Ok(success(caller))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> Reply<Vec<user_entity::Model>> {
    caller.require_admin()?;
    Ok(success(user::list_users(&state.db).await?))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<IssuedUser>>), ApiError> {
    caller.require_admin()?;
    let created = user::create_user(&state.db, input).await?;
    info!(email = %created.email, by = %caller.email, "User created");

    let api_token = created.api_token.clone();
    Ok((
        StatusCode::CREATED,
        success(IssuedUser {
            user: created,
            api_token,
        }),
    ))
}
