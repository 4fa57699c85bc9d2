//! Financial report endpoints.

use super::{ApiQuery, ApiResponse, AppState, RangeQuery, error::ApiError, success};
use crate::core::report::{CashFlow, IncomeStatement, LotProfitability};
use axum::{Json, Router, extract::State, routing::get};

type Reply<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Routes under `/reports`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/dre", get(income_statement))
        .route("/reports/cash-flow", get(cash_flow))
        .route("/reports/lots", get(lots))
}

async fn income_statement(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> Reply<IncomeStatement> {
    let range = query.range()?;
    Ok(success(state.dashboard.income_statement(range).await?))
}

async fn cash_flow(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> Reply<CashFlow> {
    let range = query.range()?;
    Ok(success(state.dashboard.cash_flow(range).await?))
}

async fn lots(State(state): State<AppState>) -> Reply<Vec<LotProfitability>> {
    Ok(success(state.dashboard.lot_profitability().await?))
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{app_with, open_app, send};
    use crate::config::AppConfig;
    use crate::core::{expense::create_expense, revenue::create_revenue};
    use crate::errors::Result;
    use crate::test_utils::{new_expense, new_revenue};
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_dre_over_date_bounds() -> Result<()> {
        let (app, db) = open_app().await?;
        let march = Utc.with_ymd_and_hms(2024, 3, 31, 18, 0, 0).single();
        let april = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).single();
        create_revenue(&db, new_revenue(Some(900.0), true, march)).await?;
        create_revenue(&db, new_revenue(Some(400.0), true, april)).await?;
        if let Some(due) = march {
            create_expense(&db, new_expense("Feed", Some(300.0), due)).await?;
        }

        let (status, body) = send(
            &app,
            "GET",
            "/reports/dre?start=2024-03-01&end=2024-03-31",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["grossRevenue"], 900.0);
        assert_eq!(body["data"]["operatingExpenses"], 300.0);
        assert_eq!(body["data"]["netResult"], 600.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_dates_are_400() -> Result<()> {
        let (app, _db) = open_app().await?;
        let (status, body) =
            send(&app, "GET", "/reports/cash-flow?start=yesterday", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            "GET",
            "/reports/dre?start=2024-05-01&end=2024-04-01",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_lots_report() -> Result<()> {
        let (app, _db) = open_app().await?;
        let (status, body) = send(&app, "GET", "/reports/lots", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_report_is_504() -> Result<()> {
        let mut config = AppConfig::default();
        config.auth.enabled = false;
        config.server.request_timeout_secs = 0;
        let (app, _db) = app_with(&config).await?;

        let (status, body) = send(&app, "GET", "/reports/lots", None, None).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["code"], "TIMEOUT");

        let (status, _) = send(&app, "GET", "/expenses/stats", None, None).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        Ok(())
    }
}
