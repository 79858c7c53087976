//! Entity shapes: stored records as returned to clients, and the requests that create or change them.

pub mod order;
pub mod product;

pub use order::{Order, OrderCreateRequest};
pub use product::{Product, ProductCreateRequest, ProductUpdateRequest};

use crate::error::AppError;
use crate::repository::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, AppError> {
    Ok(serde_json::from_value(serde_json::Value::Object(record))?)
}

/// Marks a field as present even when its value is null; pair with `#[serde(default)]`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
