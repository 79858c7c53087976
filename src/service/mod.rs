//! Per-entity services: request shapes in, repository calls, response shapes out.

mod order;
mod product;
pub mod validation;
pub use order::{OrderListQuery, OrderService};
pub use product::{ProductListQuery, ProductService};
