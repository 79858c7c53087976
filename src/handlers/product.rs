//! Product handlers: create, list, read, partial update, delete.

use super::{parse_id, request_from_body};
use crate::error::AppError;
use crate::models::{ProductCreateRequest, ProductUpdateRequest};
use crate::response;
use crate::service::{ProductListQuery, ProductService};
use crate::state::AppState;
use crate::table::PRODUCT;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn service(state: &AppState) -> ProductService {
    ProductService::new(state.repositories.repository(&PRODUCT))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request: ProductCreateRequest = request_from_body(body)?;
    let product = service(&state).create(request).await?;
    Ok(response::created(product))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ProductListQuery::from_params(&params)?;
    let page = service(&state)
        .paginate(&query, &state.collection_url("products"))
        .await?;
    Ok(response::ok(page))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let product = service(&state).get_detail(id).await?;
    Ok(response::ok(product))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let request: ProductUpdateRequest = request_from_body(body)?;
    let product = service(&state).update(id, request).await?;
    Ok(response::ok(product))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
