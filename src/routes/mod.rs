//! Router assembly.

mod common;
mod order;
mod product;

pub use common::common_routes;
pub use order::order_routes;
pub use product::product_routes;

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are refused with 413.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full application: products, orders and the common endpoints, with request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(product_routes())
        .merge(order_routes())
        .merge(common_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
