//! CRUD endpoints for purchases, pens, partners, sales and cycles.

use super::{
    ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, Listing, error::ApiError, parse_range,
    success,
};
use crate::{
    core::{
        Page,
        cycle::{self, NewCycle},
        partner::{self, NewPartner, PartnerFilter},
        pen::{self, NewPen, PenFilter},
        purchase::{self, NewPurchase, PurchaseFilter},
        sale::{self, NewSale, SaleFilter},
    },
    entities::{
        CycleStatus, PartnerType, PenStatus, PurchaseStatus, cattle_purchase, cycle as cycle_entity,
        partner as partner_entity, pen as pen_entity, sale_record,
    },
    errors::Error,
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

type Reply<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct Deleted {
    /// Id of the removed row
    pub id: i64,
}

/// Routes for the livestock side of the operation.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", get(list_purchases).post(create_purchase))
        .route(
            "/purchases/{id}",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
        .route("/pens", get(list_pens).post(create_pen))
        .route("/pens/{id}", get(get_pen).put(update_pen).delete(delete_pen))
        .route("/partners", get(list_partners).post(create_partner))
        .route(
            "/partners/{id}",
            get(get_partner).put(update_partner).delete(delete_partner),
        )
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/{id}", get(get_sale).put(update_sale).delete(delete_sale))
        .route("/cycles", get(list_cycles).post(create_cycle))
        .route(
            "/cycles/{id}",
            get(get_cycle).put(update_cycle).delete(delete_cycle),
        )
}

// Purchases

/// Filters accepted by `GET /purchases`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseQuery {
    from: Option<String>,
    to: Option<String>,
    status: Option<PurchaseStatus>,
    pen_id: Option<i64>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_purchases(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PurchaseQuery>,
) -> Reply<Listing<cattle_purchase::Model>> {
    let filter = PurchaseFilter {
        range: parse_range(query.from.as_deref(), query.to.as_deref())?,
        status: query.status,
        pen_id: query.pen_id,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = purchase::list_purchases(&state.db, filter, page).await?;
    let total = purchase::count_purchases(&state.db, filter).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn get_purchase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<cattle_purchase::Model> {
    let row = purchase::get_purchase_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("purchase", id))?;
    Ok(success(row))
}

async fn create_purchase(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPurchase>,
) -> Created<cattle_purchase::Model> {
    let row = purchase::create_purchase(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_purchase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewPurchase>,
) -> Reply<cattle_purchase::Model> {
    Ok(success(purchase::update_purchase(&state.db, id, input).await?))
}

async fn delete_purchase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<Deleted> {
    purchase::delete_purchase(&state.db, id).await?;
    Ok(success(Deleted { id }))
}

// Pens

/// Filters accepted by `GET /pens`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenQuery {
    status: Option<PenStatus>,
    is_active: Option<bool>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_pens(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PenQuery>,
) -> Reply<Listing<pen_entity::Model>> {
    let filter = PenFilter {
        status: query.status,
        is_active: query.is_active,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = pen::list_pens(&state.db, filter, page).await?;
    let total = pen::count_pens(&state.db, filter).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn get_pen(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<pen_entity::Model> {
    let row = pen::get_pen_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("pen", id))?;
    Ok(success(row))
}

async fn create_pen(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPen>,
) -> Created<pen_entity::Model> {
    let row = pen::create_pen(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_pen(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewPen>,
) -> Reply<pen_entity::Model> {
    Ok(success(pen::update_pen(&state.db, id, input).await?))
}

async fn delete_pen(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Reply<Deleted> {
    pen::delete_pen(&state.db, id).await?;
    Ok(success(Deleted { id }))
}

// Partners

/// Filters accepted by `GET /partners`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerQuery {
    partner_type: Option<PartnerType>,
    is_active: Option<bool>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_partners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PartnerQuery>,
) -> Reply<Listing<partner_entity::Model>> {
    let filter = PartnerFilter {
        partner_type: query.partner_type,
        is_active: query.is_active,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = partner::list_partners(&state.db, filter, page).await?;
    let total = partner::count_partners(&state.db, filter).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn get_partner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<partner_entity::Model> {
    let row = partner::get_partner_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("partner", id))?;
    Ok(success(row))
}

async fn create_partner(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPartner>,
) -> Created<partner_entity::Model> {
    let row = partner::create_partner(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_partner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewPartner>,
) -> Reply<partner_entity::Model> {
    Ok(success(partner::update_partner(&state.db, id, input).await?))
}

async fn delete_partner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<Deleted> {
    partner::delete_partner(&state.db, id).await?;
    Ok(success(Deleted { id }))
}

// Sales

/// Filters accepted by `GET /sales`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleQuery {
    from: Option<String>,
    to: Option<String>,
    lot_id: Option<i64>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_sales(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SaleQuery>,
) -> Reply<Listing<sale_record::Model>> {
    let filter = SaleFilter {
        range: parse_range(query.from.as_deref(), query.to.as_deref())?,
        lot_id: query.lot_id,
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = sale::list_sales(&state.db, filter, page).await?;
    let total = sale::count_sales(&state.db, filter).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn get_sale(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<sale_record::Model> {
    let row = sale::get_sale_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("sale", id))?;
    Ok(success(row))
}

async fn create_sale(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewSale>,
) -> Created<sale_record::Model> {
    let row = sale::create_sale(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_sale(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewSale>,
) -> Reply<sale_record::Model> {
    Ok(success(sale::update_sale(&state.db, id, input).await?))
}

async fn delete_sale(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Reply<Deleted> {
    sale::delete_sale(&state.db, id).await?;
    Ok(success(Deleted { id }))
}

// Cycles

/// Filters accepted by `GET /cycles`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleQuery {
    status: Option<CycleStatus>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn list_cycles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CycleQuery>,
) -> Reply<Listing<cycle_entity::Model>> {
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let items = cycle::list_cycles(&state.db, query.status, page).await?;
    let total = cycle::count_cycles(&state.db, query.status).await?;
    Ok(success(Listing::new(items, total, page)))
}

async fn get_cycle(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Reply<cycle_entity::Model> {
    let row = cycle::get_cycle_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::not_found("cycle", id))?;
    Ok(success(row))
}

async fn create_cycle(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCycle>,
) -> Created<cycle_entity::Model> {
    let row = cycle::create_cycle(&state.db, input).await?;
    Ok((StatusCode::CREATED, success(row)))
}

async fn update_cycle(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewCycle>,
) -> Reply<cycle_entity::Model> {
    Ok(success(cycle::update_cycle(&state.db, id, input).await?))
}

async fn delete_cycle(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Reply<Deleted> {
    cycle::delete_cycle(&state.db, id).await?;
    Ok(success(Deleted { id }))
}
