//! Dashboard endpoints.

use super::{ApiQuery, ApiResponse, AppState, error::ApiError, success};
use crate::core::{
    alerts::Alert,
    charts::{ChartSeries, Period},
    dashboard::{DashboardMetrics, DashboardOverview},
};
use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;

type Reply<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// `?period=` query
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// `day`, `week`, `month` or `year`; month when absent
    pub period: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> Result<Period, ApiError> {
        match self.period.as_deref() {
            None => Ok(Period::default()),
            Some(value) => value.parse().map_err(ApiError::from),
        }
    }
}

/// Routes under `/dashboard`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(overview))
        .route("/dashboard/metrics", get(metrics))
        .route("/dashboard/charts", get(charts))
        .route("/dashboard/alerts", get(alerts))
}

async fn metrics(State(state): State<AppState>) -> Reply<DashboardMetrics> {
    Ok(success(state.dashboard.metrics().await?))
}

async fn charts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> Reply<ChartSeries> {
    let period = query.period()?;
    Ok(success(state.dashboard.charts(period).await?))
}

async fn alerts(State(state): State<AppState>) -> Reply<Vec<Alert>> {
    Ok(success(state.dashboard.alerts().await?))
}

async fn overview(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> Reply<DashboardOverview> {
    let period = query.period()?;
    Ok(success(state.dashboard.overview(period).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{open_app, send};
    use crate::core::revenue::create_revenue;
    use crate::errors::Result;
    use crate::test_utils::new_revenue;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_invalid_period_is_400() -> Result<()> {
        let (app, _db) = open_app().await?;
        let (status, body) =
            send(&app, "GET", "/dashboard/charts?period=quarter", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PERIOD");
        Ok(())
    }

    #[tokio::test]
    async fn test_charts_default_to_month() -> Result<()> {
        let (app, _db) = open_app().await?;
        let (status, body) = send(&app, "GET", "/dashboard/charts", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["period"], "month");
        assert_eq!(body["data"]["buckets"].as_array().map(Vec::len), Some(12));

        let (_, body) = send(&app, "GET", "/dashboard/charts?period=year", None, None).await;
        assert_eq!(body["data"]["buckets"].as_array().map(Vec::len), Some(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_metrics_revenue_scenario() -> Result<()> {
        let (app, db) = open_app().await?;
        let now = Utc::now();
        create_revenue(&db, new_revenue(Some(100.0), true, None)).await?;
        create_revenue(&db, new_revenue(Some(50.0), false, Some(now - Duration::days(1)))).await?;
        create_revenue(&db, new_revenue(Some(75.0), false, Some(now + Duration::days(1)))).await?;

        let (status, body) = send(&app, "GET", "/dashboard/metrics", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let revenues = &body["data"]["revenues"];
        assert_eq!(revenues["total"], 3);
        assert_eq!(revenues["totalAmount"], 225.0);
        assert_eq!(revenues["received"], 1);
        assert_eq!(revenues["pending"], 2);
        assert_eq!(revenues["overdue"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_overview_shape() -> Result<()> {
        let (app, _db) = open_app().await?;
        let (status, body) = send(&app, "GET", "/dashboard?period=week", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert!(data["metrics"].is_object());
        assert_eq!(data["charts"]["period"], "week");
        assert!(data["alerts"].is_array());
        assert!(data["lastUpdate"].is_string());
        Ok(())
    }
}
