//! Product lookup against a local HTTP server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use fitscan_core::{
    LookupConfig, LookupError, NutritionLedger, ProductLookupClient, ScanCommand, ScanDriver,
    ScanEvent, ScanMode, ScanNotice, ScanSession, ScanUpdate,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v2/search/item", addr)
}

fn client(endpoint: String) -> ProductLookupClient {
    ProductLookupClient::new(LookupConfig::new("test-id", "test-key").with_endpoint(endpoint))
}

/// Answers like the item search API, requiring credentials.
async fn item_search(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let authorized = headers.get("x-app-id").is_some_and(|v| v == "test-id")
        && headers.get("x-app-key").is_some_and(|v| v == "test-key");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "unauthorized"})));
    }

    match params.get("upc").map(String::as_str) {
        Some("012345678905") => (
            StatusCode::OK,
            Json(json!({
                "foods": [{
                    "food_name": "Granola Bar",
                    "nf_calories": 190,
                    "nf_protein": 4,
                    "nf_total_carbohydrate": 29,
                    "nf_total_fat": 7
                }]
            })),
        ),
        Some("000000000017") => (
            StatusCode::OK,
            Json(json!({
                "foods": [{
                    "food_name": null,
                    "nf_calories": 120,
                    "nf_protein": null,
                    "nf_total_carbohydrate": null,
                    "nf_total_fat": 3.5
                }]
            })),
        ),
        _ => (StatusCode::OK, Json(json!({"foods": []}))),
    }
}

#[tokio::test]
async fn test_lookup_maps_first_food() {
    let endpoint = serve(Router::new().route("/v2/search/item", get(item_search))).await;

    let product = client(endpoint).lookup("012345678905").await.unwrap();

    assert_eq!(product.name, "Granola Bar");
    assert_eq!(product.calories, 190.0);
    assert_eq!(product.protein, 4.0);
    assert_eq!(product.carbohydrates, 29.0);
    assert_eq!(product.fat, 7.0);
}

#[tokio::test]
async fn test_lookup_null_fields_default() {
    let endpoint = serve(Router::new().route("/v2/search/item", get(item_search))).await;

    let product = client(endpoint).lookup("000000000017").await.unwrap();

    assert_eq!(product.name, "Unknown Product");
    assert_eq!(product.calories, 120.0);
    assert_eq!(product.protein, 0.0);
    assert_eq!(product.carbohydrates, 0.0);
    assert_eq!(product.fat, 3.5);
}

#[tokio::test]
async fn test_lookup_sends_payload_verbatim() {
    let app = Router::new().route(
        "/v2/search/item",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let upc = params.get("upc").cloned().unwrap_or_default();
            Json(json!({"foods": [{"food_name": format!("[{}]", upc), "nf_calories": 1}]}))
        }),
    );
    let endpoint = serve(app).await;

    let product = client(endpoint).lookup(" 0123-AB ").await.unwrap();

    assert_eq!(product.name, "[ 0123-AB ]");
}

#[tokio::test]
async fn test_lookup_no_foods_is_not_found() {
    let endpoint = serve(Router::new().route("/v2/search/item", get(item_search))).await;

    let result = client(endpoint).lookup("999").await;

    assert_eq!(result, Err(LookupError::NotFound("999".into())));
}

#[tokio::test]
async fn test_lookup_wrong_credentials() {
    let endpoint = serve(Router::new().route("/v2/search/item", get(item_search))).await;
    let client =
        ProductLookupClient::new(LookupConfig::new("other", "creds").with_endpoint(endpoint));

    let err = client.lookup("012345678905").await.unwrap_err();

    assert_eq!(err, LookupError::Status(401));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_lookup_server_error() {
    let app = Router::new().route(
        "/v2/search/item",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let endpoint = serve(app).await;

    let err = client(endpoint).lookup("012345678905").await.unwrap_err();

    assert_eq!(err, LookupError::Status(500));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_lookup_malformed_body() {
    let app = Router::new().route("/v2/search/item", get(|| async { "<html>nope</html>" }));
    let endpoint = serve(app).await;

    let err = client(endpoint).lookup("012345678905").await.unwrap_err();

    assert!(matches!(err, LookupError::MalformedBody(_)));
}

#[tokio::test]
async fn test_lookup_times_out() {
    let app = Router::new().route(
        "/v2/search/item",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"foods": []}))
        }),
    );
    let endpoint = serve(app).await;
    let client = ProductLookupClient::new(
        LookupConfig::new("test-id", "test-key")
            .with_endpoint(endpoint)
            .with_timeout(Duration::from_millis(200)),
    );

    let err = client.lookup("012345678905").await.unwrap_err();

    assert!(matches!(err, LookupError::Timeout(_)));
}

#[tokio::test]
async fn test_lookup_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{}/v2/search/item", addr))
        .lookup("012345678905")
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Transport(_)));
}

#[tokio::test]
async fn test_scan_driver_with_http_lookup() {
    let endpoint = serve(Router::new().route("/v2/search/item", get(item_search))).await;
    let ledger = NutritionLedger::new();
    let session = ScanSession::new(ledger.clone(), ScanMode::Single);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (upd_tx, mut upd_rx) = mpsc::channel(16);
    let driver =
        tokio::spawn(ScanDriver::new(session, Arc::new(client(endpoint))).run(cmd_rx, upd_tx));

    cmd_tx.send(ScanCommand::GrantPermission).await.unwrap();
    cmd_tx.send(ScanCommand::Start).await.unwrap();
    for _ in 0..5 {
        cmd_tx
            .send(ScanCommand::Decode(ScanEvent::new("upc_a", "012345678905")))
            .await
            .unwrap();
    }

    assert_eq!(upd_rx.recv().await, Some(ScanUpdate::Armed));
    assert_eq!(
        upd_rx.recv().await,
        Some(ScanUpdate::LookupStarted("012345678905".into()))
    );
    match upd_rx.recv().await {
        Some(ScanUpdate::Finished(ScanNotice::Added(product))) => {
            assert_eq!(product.name, "Granola Bar")
        }
        other => panic!("unexpected update: {:?}", other),
    }

    cmd_tx.send(ScanCommand::Dismiss).await.unwrap();
    assert_eq!(upd_rx.recv().await, Some(ScanUpdate::Idle));

    drop(cmd_tx);
    let session = driver.await.unwrap();

    assert_eq!(session.items().len(), 1);
    let totals = ledger.snapshot();
    assert_eq!(totals.total_calories, 190.0);
    assert_eq!(totals.protein, 4.0);
    assert_eq!(totals.carbs, 29.0);
    assert_eq!(totals.fats, 7.0);
}
