use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use storefront::{app, AppState, MemoryStore};
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::new(Arc::new(MemoryStore::new()), "http://localhost:5000/"))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn widget_lifecycle() {
    let app = test_app();

    let (status, created) = call(
        &app,
        Method::POST,
        "/products/",
        Some(json!({"name": "Widget", "price": "10.00", "stock": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], json!("Widget"));
    assert_eq!(created["price"], json!("10.00"));
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = call(&app, Method::PATCH, &format!("/products/{}", id), Some(json!({"stock": 6}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], json!(6));
    assert_eq!(updated["name"], json!("Widget"));
    assert_eq!(updated["price"], json!("10.00"));

    let (status, body) = call(&app, Method::DELETE, &format!("/products/{}/", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = call(&app, Method::GET, &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("not_found"));
}

#[tokio::test]
async fn listing_envelope_and_filters() {
    let app = test_app();
    for (name, price, stock) in [("Widget", "10", 50), ("Gadget", "2000", 60), ("Wid", "20", 10)] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/products",
            Some(json!({"name": name, "price": price, "stock": stock})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = call(&app, Method::GET, "/products/?max_price=1500&min_stock=46&size=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], json!(1));
    assert_eq!(page["page"], json!(0));
    assert_eq!(page["size"], json!(1));
    assert_eq!(page["results"][0]["name"], json!("Widget"));
    assert_eq!(page["next"], Value::Null);
    assert_eq!(page["previous"], Value::Null);

    let (_, page) = call(&app, Method::GET, "/products/?search=wid&size=1", None).await;
    assert_eq!(page["count"], json!(2));
    assert_eq!(
        page["next"],
        json!("http://localhost:5000/products/?page=1&size=1&search=wid")
    );
}

#[tokio::test]
async fn bad_requests_are_classified() {
    let app = test_app();

    let (status, body) = call(&app, Method::GET, "/products/?size=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], json!("validation_error"));

    let (status, _) = call(&app, Method::GET, "/products/?size=201", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, Method::GET, "/products/?ordering=secret", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, Method::GET, "/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/products/", Some(json!(["not", "an", "object"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/products/", Some(json!({"name": "No price"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, Method::PATCH, "/products/1", Some(json!({"stock": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn orders_round_trip() {
    let app = test_app();
    let (status, created) = call(
        &app,
        Method::POST,
        "/orders/",
        Some(json!({"customer_name": "Ada", "address": "1 Loop Rd", "contents": "2x Widget"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = call(&app, Method::GET, &format!("/orders/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, page) = call(&app, Method::GET, "/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], json!(1));
    assert_eq!(page["results"][0]["customer_name"], json!("Ada"));

    let (status, _) = call(&app, Method::POST, "/orders/", Some(json!({"customer_name": "Ada"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn health_and_readiness() {
    let app = test_app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body) = call(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], json!("ok"));

    let (_, body) = call(&app, Method::GET, "/version", None).await;
    assert_eq!(body["name"], json!("storefront"));
}
