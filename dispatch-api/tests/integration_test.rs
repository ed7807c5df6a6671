use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dispatch_api::{app, AppState};
use dispatch_core::models::{ShipmentOutcome, ShipmentRecord};
use dispatch_core::repository::OrderStore;
use dispatch_order::{MemoryOrderStore, MockShipmentAdapter, OrderOrchestrator};

fn success_outcome() -> ShipmentOutcome {
    ShipmentOutcome::succeeded(ShipmentRecord {
        shipment_id: Some("SR-77".to_string()),
        status: "NEW".to_string(),
        raw: json!({ "shipment_id": "SR-77", "status": "NEW" }),
    })
}

fn test_app() -> Router {
    let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
    let shipments = Arc::new(MockShipmentAdapter::new(success_outcome()));
    let orchestrator = Arc::new(OrderOrchestrator::new(store.clone(), shipments));
    app(AppState {
        store,
        orchestrator,
    })
}

fn order_body(order_id: &str) -> Value {
    json!({
        "order_id": order_id,
        "order_created_time": "2026-08-01T10:30:00Z",
        "pickup_location": "Primary",
        "customer_name": "Jane Doe",
        "customer_address_line1": "221B Baker Street",
        "customer_pincode": "560001",
        "customer_city": "Bengaluru",
        "customer_state": "Karnataka",
        "customer_country": "India",
        "customer_phone": "9900112233",
        "customer_email": "jane@example.com",
        "order_items": [
            {
                "sku": "SKU-1",
                "sku_mrp": 499.0,
                "quantity": 2,
                "sku_name": "Notebook"
            }
        ],
        "invoice_value": 998.0,
        "dimensions": { "height": 10.0, "length": 20.0, "breadth": 15.0, "weight": 0.8 },
        "order_type": "Prepaid"
    })
}

fn post_order(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/orders/createOrder")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer test-token")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rejects_requests_without_bearer_token() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/orders/createOrder")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(order_body("ORD-1").to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creates_order_and_returns_shipment_details() {
    let app = test_app();

    let response = app.oneshot(post_order(&order_body("ORD-1"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["order_id"], json!("ORD-1"));
    assert_eq!(body["data"]["shipment_id"], json!("SR-77"));
    assert_eq!(body["data"]["shipment_status"], json!("NEW"));
    assert_eq!(body["shipment_api_response"]["success"], json!(true));
}

#[tokio::test]
async fn duplicate_order_id_returns_conflict() {
    let app = test_app();

    let first = app
        .clone()
        .oneshot(post_order(&order_body("ORD-2")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(post_order(&order_body("ORD-2"))).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = response_json(second).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn empty_order_items_is_a_validation_error() {
    let app = test_app();

    let mut body = order_body("ORD-3");
    body["order_items"] = json!([]);

    let response = app.oneshot(post_order(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_positive_dimensions_are_rejected() {
    let app = test_app();

    let mut body = order_body("ORD-4");
    body["dimensions"]["weight"] = json!(0.0);

    let response = app.oneshot(post_order(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_order_returns_persisted_order_with_items() {
    let app = test_app();

    app.clone()
        .oneshot(post_order(&order_body("ORD-5")))
        .await
        .unwrap();

    let response = app
        .oneshot(authed_get("/api/v1/orders/ORD-5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["order_id"], json!("ORD-5"));
    assert_eq!(body["data"]["order_items"][0]["sku"], json!("SKU-1"));
    assert_eq!(body["data"]["shipment_status"], json!("NEW"));
}

#[tokio::test]
async fn get_unknown_order_returns_not_found() {
    let app = test_app();

    let response = app
        .oneshot(authed_get("/api/v1/orders/NOPE"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_orders_returns_count_and_data() {
    let app = test_app();

    for i in 0..2 {
        app.clone()
            .oneshot(post_order(&order_body(&format!("ORD-L{i}"))))
            .await
            .unwrap();
    }

    let response = app.oneshot(authed_get("/api/v1/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
