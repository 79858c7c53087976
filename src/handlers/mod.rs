//! HTTP handlers for products and orders.

pub mod order;
pub mod product;

use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: '{}'", id_str)))
}

/// Malformed JSON or a non-object body is a bad request; a well-formed object of the wrong shape fails validation.
fn request_from_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> Result<T, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if !value.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| AppError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderCreateRequest;
    use serde_json::json;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_shape_errors_are_classified() {
        let err = request_from_body::<OrderCreateRequest>(Ok(Json(json!([1, 2])))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = request_from_body::<OrderCreateRequest>(Ok(Json(json!({"customer_name": "Ada"})))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
