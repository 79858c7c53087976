//! Product routes. Collection and item paths answer with and without a trailing slash.

use crate::handlers::product::{create, delete, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/", get(list).post(create))
        .route("/products/:id", get(read).patch(update).delete(delete))
        .route("/products/:id/", get(read).patch(update).delete(delete))
}
