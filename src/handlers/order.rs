//! Order handlers: create, list, read.

use super::{parse_id, request_from_body};
use crate::error::AppError;
use crate::models::OrderCreateRequest;
use crate::response;
use crate::service::{OrderListQuery, OrderService};
use crate::state::AppState;
use crate::table::ORDER;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn service(state: &AppState) -> OrderService {
    OrderService::new(state.repositories.repository(&ORDER))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request: OrderCreateRequest = request_from_body(body)?;
    let order = service(&state).create(request).await?;
    Ok(response::created(order))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = OrderListQuery::from_params(&params)?;
    let page = service(&state)
        .paginate(&query, &state.collection_url("orders"))
        .await?;
    Ok(response::ok(page))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let order = service(&state).get_detail(id).await?;
    Ok(response::ok(order))
}
