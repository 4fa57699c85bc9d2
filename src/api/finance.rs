//! Expense, revenue and category endpoints.

use super::{
    ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, Listing, error::ApiError,
    livestock::Deleted, parse_instant, parse_range, success,
};
use crate::{
    core::{
        Page,
        category::{self, NewCategory},
        expense::{self, ExpenseFilter, NewExpense},
        revenue::{self, NewRevenue, RevenueFilter},
        stats::{ExpenseStats, RevenueStats},
    },
    entities::{
        CategoryType, category as category_entity, expense as expense_entity,
        revenue as revenue_entity,
    },
    errors::Error,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;

type Reply<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Routes for the financial side of the operation.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/stats", get(expense_stats))
        .route(
            "/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/expenses/{id}/pay", post(pay_expense))
        .route("/revenues", get(list_revenues).post(create_revenue))
        .route("/revenues/stats", get(revenue_stats))
        .route(
            "/revenues/{id}",
            get(get_revenue).put(update_revenue).delete(delete_revenue),
        )
        .route("/revenues/{id}/receive", post(receive_revenue))
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// `?at=` for settling a payable or receivable; now when absent
#[derive(Debug, Default, Deserialize)]
pub struct SettleQuery {
    at: Option<String>,
}

impl SettleQuery {
    fn instant(&self) -> Result<chrono::DateTime<Utc>, Error> {
        self.at
            .as_deref()
            .map_or_else(|| Ok(Utc::now()), |value| parse_instant(value, "at", false))
    }
}

// Expenses

/// Filters accepted by `GET /expenses`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
    from: Option<String>,
    to: Option<String>,
    is_paid: Option<bool>,
    category: Option<String>,
    purchase_id: Option<i64>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_expenses(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExpenseQuery>,
) -> Reply<Listing<expense_entity::Model>> {
    let filter = ExpenseFilter {
        range: parse_range(query.from.as_deref(), query.to.as_deref())?,
        is_paid: query.is_paid,
        category: query.category,
        purchase_id: query.purchase_id,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = expense::list_expenses(&state.db, filter.clone(), page).await?;
    let total = expense::count_expenses(&state.db, filter).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn expense_stats(State(state): State<AppState>) -> Reply<ExpenseStats> {
    Ok(success(state.dashboard.expense_stats().await?))
}

async fn get_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<expense_entity::Model> {
    let row = expense::get_expense_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("expense", id))?;
    Ok(success(row))
}

async fn create_expense(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewExpense>,
) -> Created<expense_entity::Model> {
    let row = expense::create_expense(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewExpense>,
) -> Reply<expense_entity::Model> {
    Ok(success(expense::update_expense(&state.db, id, input).await?))
}

async fn pay_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SettleQuery>,
) -> Reply<expense_entity::Model> {
    let paid_at = query.instant()?;
    Ok(success(expense::mark_expense_paid(&state.db, id, paid_at).await?))
}

async fn delete_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<Deleted> {
    expense::delete_expense(&state.db, id).await?;
    Ok(success(Deleted { id }))
}

// Revenues

/// Filters accepted by `GET /revenues`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueQuery {
    from: Option<String>,
    to: Option<String>,
    is_received: Option<bool>,
    category: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_revenues(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Reply<Listing<revenue_entity::Model>> {
    let filter = RevenueFilter {
        range: parse_range(query.from.as_deref(), query.to.as_deref())?,
        is_received: query.is_received,
        category: query.category,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = revenue::list_revenues(&state.db, filter.clone(), page).await?;
    let total = revenue::count_revenues(&state.db, filter).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn revenue_stats(State(state): State<AppState>) -> Reply<RevenueStats> {
    Ok(success(state.dashboard.revenue_stats().await?))
}

async fn get_revenue(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<revenue_entity::Model> {
    let row = revenue::get_revenue_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("revenue", id))?;
    Ok(success(row))
}

async fn create_revenue(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewRevenue>,
) -> Created<revenue_entity::Model> {
    let row = revenue::create_revenue(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_revenue(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewRevenue>,
) -> Reply<revenue_entity::Model> {
    Ok(success(revenue::update_revenue(&state.db, id, input).await?))
}

async fn receive_revenue(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SettleQuery>,
) -> Reply<revenue_entity::Model> {
    let received_at = query.instant()?;
    Ok(success(
        revenue::mark_revenue_received(&state.db, id, received_at).await?,
    ))
}

async fn delete_revenue(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<Deleted> {
    revenue::delete_revenue(&state.db, id).await?;
    Ok(success(Deleted { id }))
}

// Categories

/// Filters accepted by `GET /categories`
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    category_type: Option<CategoryType>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Reply<Listing<category_entity::Model>> {
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = category::list_categories(&state.db, query.category_type, page).await?;
    let total = category::count_categories(&state.db, query.category_type).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<category_entity::Model> {
    let row = category::get_category_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("category", id))?;
    Ok(success(row))
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCategory>,
) -> Created<category_entity::Model> {
    let row = category::create_category(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewCategory>,
) -> Reply<category_entity::Model> {
    Ok(success(category::update_category(&state.db, id, input).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<Deleted> {
    category::delete_category(&state.db, id).await?;
    Ok(success(Deleted { id }))
}
