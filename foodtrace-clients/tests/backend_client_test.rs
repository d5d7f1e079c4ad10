//! Integration tests for the ingredient document API client
//!
//! Each test serves a fake document API on an ephemeral port.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use foodtrace_clients::ingredients::{BackendClient, IngredientSource};
use foodtrace_clients::ClientError;
use serde_json::{json, Value};
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn mango() -> Value {
    json!({
        "batchNumber": "B1",
        "name": "Mango",
        "origin": "Taiwan",
        "supplier": "S1",
        "testResult": "Pass",
        "testDetails": {"pesticide": "none"}
    })
}

#[tokio::test]
async fn test_list_all_ingredients() {
    let app = Router::new().route(
        "/ingredients",
        get(|| async {
            Json(json!({"data": [
                mango(),
                {"batchNumber": "B2"},
                {
                    "batchNumber": "B3",
                    "name": "Banana",
                    "origin": "Kaohsiung",
                    "supplier": "S2",
                    "testResult": "Fail"
                }
            ]}))
        }),
    );
    let client = BackendClient::new(&serve(app).await, Duration::from_secs(2)).unwrap();

    let records = client.list_all_ingredients().await.unwrap();
    let batches: Vec<&str> = records.iter().map(|r| r.batch_number.as_str()).collect();
    assert_eq!(batches, vec!["B1", "B3"]);
    assert_eq!(records[0].rendered_details(), vec![("pesticide", "none".to_string())]);
}

#[tokio::test]
async fn test_list_with_null_data_is_empty() {
    let app = Router::new().route("/ingredients", get(|| async { Json(json!({"data": null})) }));
    let client = BackendClient::new(&serve(app).await, Duration::from_secs(2)).unwrap();

    assert!(client.list_all_ingredients().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_server_error() {
    let app = Router::new().route(
        "/ingredients",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = BackendClient::new(&serve(app).await, Duration::from_secs(2)).unwrap();

    let err = client.list_all_ingredients().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
    assert!(err.is_unavailable());
    assert!(client.ping().await.is_err());
}

#[tokio::test]
async fn test_list_malformed_body() {
    let app = Router::new().route("/ingredients", get(|| async { "definitely not json" }));
    let client = BackendClient::new(&serve(app).await, Duration::from_secs(2)).unwrap();

    assert!(client.list_all_ingredients().await.is_err());
}

#[tokio::test]
async fn test_get_ingredient_by_batch() {
    let app = Router::new().route(
        "/ingredients/:batch",
        get(|Path(batch): Path<String>| async move {
            if batch == "B1" {
                (StatusCode::OK, Json(json!({"data": mango()})))
            } else {
                (StatusCode::NOT_FOUND, Json(json!({"message": "not found"})))
            }
        }),
    );
    let client = BackendClient::new(&serve(app).await, Duration::from_secs(2)).unwrap();

    let record = client.get_ingredient_by_batch("B1").await.unwrap().unwrap();
    assert_eq!(record.name, "Mango");

    assert!(client.get_ingredient_by_batch("B404").await.unwrap().is_none());
}

#[tokio::test]
async fn test_request_timeout() {
    let app = Router::new().route(
        "/ingredients",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"data": []}))
        }),
    );
    let client = BackendClient::new(&serve(app).await, Duration::from_millis(200)).unwrap();

    let err = client.list_all_ingredients().await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }));
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Port 1 is reserved and refuses connections
    let client = BackendClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();

    let err = client.list_all_ingredients().await.unwrap_err();
    assert!(err.is_unavailable());
}
