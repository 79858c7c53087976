//! Order routes.

use crate::handlers::order::{create, list, read};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/", get(list).post(create))
        .route("/orders/:id", get(read))
        .route("/orders/:id/", get(read))
}
