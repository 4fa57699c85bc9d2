//! HTTP routing layer.
//!
//! Builds the axum [`Router`]: bearer-token authentication, request parsing,
//! controllers and the `{ "status": "success", "data": ... }` envelope. The
//! controllers only translate between HTTP and the `core` functions.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod finance;
pub mod livestock;
pub mod reports;
pub mod users;

use crate::{
    config::{AppConfig, AuthConfig},
    core::{DateRange, Page, dashboard::DashboardService},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    middleware,
    routing::get,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use error::ApiError;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection pool
    pub db: Arc<DatabaseConnection>,
    /// Aggregation service over the same pool
    pub dashboard: DashboardService,
    /// Authentication settings
    pub auth: AuthConfig,
}

impl AppState {
    /// Builds the state from an open connection and the loaded configuration.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        let dashboard = DashboardService::new(
            Arc::clone(&db),
            config.server.request_timeout(),
            config.alerts,
        );
        Self {
            db,
            dashboard,
            auth: config.auth,
        }
    }
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    status: &'static str,
    data: T,
}

/// Wraps `data` in the success envelope.
pub const fn success<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        status: "success",
        data,
    })
}

/// One page of a list endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Rows matching the filter across all pages
    pub total: u64,
    /// Effective page size
    pub limit: u64,
    /// Rows skipped
    pub offset: u64,
}

impl<T> Listing<T> {
    /// Pairs a page of rows with the total count.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            items,
            total,
            limit: page.limit(),
            offset: page.offset.unwrap_or(0),
        }
    }
}

/// JSON body whose rejection renders as an [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejection renders as an [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters whose rejection renders as an [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// A plain date used as an upper bound covers the whole day, so it resolves to
/// the following midnight.
pub fn parse_instant(value: &str, field: &str, upper_bound: bool) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    let invalid = || {
        Error::validation(format!(
            "{field} must be an RFC 3339 timestamp or a YYYY-MM-DD date"
        ))
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    let date = if upper_bound {
        date.succ_opt().ok_or_else(invalid)?
    } else {
        date
    };
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Parses optional `from`/`to` query values into a [`DateRange`].
pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<DateRange> {
    let range = DateRange {
        from: from.map(|v| parse_instant(v, "from", false)).transpose()?,
        to: to.map(|v| parse_instant(v, "to", true)).transpose()?,
    };
    if let (Some(from), Some(to)) = (range.from, range.to)
        && from >= to
    {
        return Err(Error::validation("from must be before to"));
    }
    Ok(range)
}

/// `from`/`to` window; `start`/`end` are accepted as aliases
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    /// Lower bound
    #[serde(alias = "start")]
    pub from: Option<String>,
    /// Upper bound
    #[serde(alias = "end")]
    pub to: Option<String>,
}

impl RangeQuery {
    /// Parsed window.
    pub fn range(&self) -> Result<DateRange> {
        parse_range(self.from.as_deref(), self.to.as_deref())
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> std::result::Result<Json<Health>, ApiError> {
    state.db.ping().await?;
    Ok(Json(Health {
        status: "ok",
        database: "up",
    }))
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(dashboard::routes())
        .merge(reports::routes())
        .merge(livestock::routes())
        .merge(finance::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::UserRole, test_utils::*};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::Value;
    use tower::ServiceExt;

    /// Router over an in-memory database with the given settings.
    pub async fn app_with(config: &AppConfig) -> Result<(Router, Arc<DatabaseConnection>)> {
        let db = Arc::new(setup_test_db().await?);
        Ok((router(AppState::new(Arc::clone(&db), config)), db))
    }

    /// Router over an in-memory database with auth disabled.
    pub async fn open_app() -> Result<(Router, Arc<DatabaseConnection>)> {
        let mut config = AppConfig::default();
        config.auth.enabled = false;
        app_with(&config).await
    }

    /// Router over an in-memory database with auth enabled.
    pub async fn secured_app() -> Result<(Router, Arc<DatabaseConnection>)> {
        app_with(&AppConfig::default()).await
    }

    /// Sends a request and returns status and decoded JSON body.
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[test]
    fn test_parse_instant() {
        let start = parse_instant("2024-03-01", "from", false).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let end = parse_instant("2024-03-31", "to", true).unwrap();
        assert_eq!(end.to_rfc3339(), "2024-04-01T00:00:00+00:00");
        let exact = parse_instant("2024-03-31T12:00:00-03:00", "to", true).unwrap();
        assert_eq!(exact.to_rfc3339(), "2024-03-31T15:00:00+00:00");
        assert!(matches!(
            parse_instant("March", "from", false),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_parse_range_rejects_inverted_window() {
        assert!(parse_range(Some("2024-03-10"), Some("2024-03-01")).is_err());
        assert!(parse_range(Some("2024-03-01"), Some("2024-03-01")).is_ok());
        assert_eq!(parse_range(None, None).unwrap(), DateRange::default());
    }

    #[tokio::test]
    async fn test_health_is_public() -> Result<()> {
        let (app, _db) = secured_app().await?;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_success_envelope() -> Result<()> {
        let (app, db) = secured_app().await?;
        let user = create_test_user(&db, "viewer@farm.test", UserRole::Viewer).await?;

        let (status, body) =
            send(&app, "GET", "/dashboard/metrics", Some(&user.api_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["totalPurchases"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_database_failure_is_503() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let mut config = AppConfig::default();
        config.auth.enabled = false;
        let app = router(AppState::new(Arc::new(db), &config));

        let (status, body) = send(&app, "GET", "/dashboard/metrics", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "DATA_UNAVAILABLE");
    }
}
