use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use trustflow_api::{app, AppState};
use trustflow_catalog::ListingService;
use trustflow_order::{FeeScheduler, FirstAvailablePolicy, OrderWorkflow};
use trustflow_risk::{HeuristicClassifier, RiskClassifierGateway, TrustScoreEvaluator};
use trustflow_store::MemoryStore;

fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let evaluator = TrustScoreEvaluator::default();
    let gateway = Arc::new(RiskClassifierGateway::new(
        Arc::new(HeuristicClassifier),
        evaluator,
    ));
    let listings = Arc::new(ListingService::new(store.clone(), store.clone(), gateway));
    let workflow = Arc::new(OrderWorkflow::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(FirstAvailablePolicy),
        evaluator,
        FeeScheduler::default(),
        false,
    ));
    app(AppState {
        listings,
        workflow,
        carriers: store,
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_listing(app: &Router) -> (String, String, String) {
    let (status, seller) = send(
        app,
        "POST",
        "/sellers",
        Some(json!({"display_name": "astra-electronics"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seller_id = seller["id"].as_str().unwrap().to_string();

    let (status, carrier) =
        send(app, "POST", "/carriers", Some(json!({"name": "rapid-post"}))).await;
    assert_eq!(status, StatusCode::OK);
    let carrier_id = carrier["id"].as_str().unwrap().to_string();

    let (status, product) = send(
        app,
        "POST",
        "/products",
        Some(json!({
            "seller_id": seller_id,
            "title": "Refurbished laptop",
            "description": "Lightly used, charger included",
            "price": "1200.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = product["id"].as_str().unwrap().to_string();

    (seller_id, carrier_id, product_id)
}

#[tokio::test]
async fn analyze_returns_the_wire_contract() {
    let app = test_app();
    let (status, seller) = send(
        &app,
        "POST",
        "/sellers",
        Some(json!({"display_name": "astra-electronics"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, assessment) = send(
        &app,
        "POST",
        "/analyze",
        Some(json!({
            "seller_id": seller["id"],
            "title": "Refurbished laptop",
            "description": "Lightly used",
            "price": "1200.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Fresh seller reputation is 50 -> Medium band under default thresholds.
    assert_eq!(assessment["trust_score"], json!(50.0));
    assert_eq!(assessment["risk_level"], "Medium");
    assert!(assessment["red_flags"].as_array().unwrap().is_empty());
    assert!(assessment["recommended_escrow"].is_boolean());
}

#[tokio::test]
async fn zero_price_is_a_validation_error() {
    let app = test_app();
    let (_, seller) = send(
        &app,
        "POST",
        "/sellers",
        Some(json!({"display_name": "astra-electronics"})),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/analyze",
        Some(json!({
            "seller_id": seller["id"],
            "title": "Freebie",
            "description": "",
            "price": "0.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("positive"));
}

#[tokio::test]
async fn purchase_and_release_round_trip() {
    let app = test_app();
    let (seller_id, _, product_id) = seed_listing(&app).await;
    let buyer_id = uuid::Uuid::new_v4().to_string();

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({"product_id": product_id, "buyer_id": buyer_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["escrow_status"], "HELD");
    assert_eq!(order["order_status"], "PENDING");
    assert_eq!(order["total_amount"], "1200.00");
    assert_eq!(order["platform_fee"], "60.00");
    assert_eq!(order["net_amount"], "1140.00");
    let order_id = order["id"].as_str().unwrap();

    let (status, shipped) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/ship"),
        Some(json!({
            "actor": {"role": "SELLER", "id": seller_id},
            "tracking_code": "TRK-1001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shipped["order_status"], "SHIPPED");

    let (status, confirmed) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/confirm"),
        Some(json!({"actor": {"role": "BUYER", "id": buyer_id}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["escrow_status"], "RELEASED");
    assert_eq!(confirmed["order_status"], "COMPLETED");

    // Terminal state: a second confirmation conflicts.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/confirm"),
        Some(json!({"actor": {"role": "BUYER", "id": buyer_id}})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Invalid escrow transition"));

    // Buyer reviews the released order; reputation folds in the rating.
    let (status, seller) = send(
        &app,
        "POST",
        "/reviews",
        Some(json!({"order_id": order_id, "reviewer_id": buyer_id, "rating": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seller["reputation_score"], json!(100.0));
}

#[tokio::test]
async fn dispute_flow_refunds_the_buyer() {
    let app = test_app();
    let (_, _, product_id) = seed_listing(&app).await;
    let buyer_id = uuid::Uuid::new_v4().to_string();

    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({"product_id": product_id, "buyer_id": buyer_id})),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, disputed) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/dispute"),
        Some(json!({"actor": {"role": "BUYER", "id": buyer_id}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(disputed["escrow_status"], "DISPUTED");

    let (status, resolved) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/resolve"),
        Some(json!({
            "arbiter_id": uuid::Uuid::new_v4().to_string(),
            "outcome": "BUYER_FAVOR"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["escrow_status"], "REFUNDED");
    assert_eq!(resolved["order_status"], "REFUNDED");
}

#[tokio::test]
async fn withdrawn_listing_rejects_purchases() {
    let app = test_app();
    let (seller_id, _, product_id) = seed_listing(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/products/{product_id}/withdraw"),
        Some(json!({"seller_id": seller_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "product_id": product_id,
            "buyer_id": uuid::Uuid::new_v4().to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("withdrawn"));

    // Withdrawn listings drop out of the public catalog.
    let (status, listed) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "GET",
        &format!("/orders/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tier_upgrade_changes_future_commissions() {
    let app = test_app();
    let (seller_id, _, product_id) = seed_listing(&app).await;

    let (status, upgraded) = send(
        &app,
        "POST",
        &format!("/sellers/{seller_id}/upgrade"),
        Some(json!({"tier": "Gold"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upgraded["tier"], "Gold");

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "product_id": product_id,
            "buyer_id": uuid::Uuid::new_v4().to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["platform_fee"], "36.00"); // Gold 3% of 1200.00

    let (status, _) = send(
        &app,
        "POST",
        &format!("/sellers/{seller_id}/upgrade"),
        Some(json!({"tier": "Diamond"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
