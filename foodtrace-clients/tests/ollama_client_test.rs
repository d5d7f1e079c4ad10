//! Integration tests for the Ollama client against a fake engine

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use foodtrace_clients::inference::{ChatBackend, ChatMessage, OllamaClient};
use foodtrace_clients::ClientError;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Recorded {
    chat_body: Arc<Mutex<Option<Value>>>,
    pulls: Arc<Mutex<u32>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn fake_engine(models: Value, pull_body: &'static str, recorded: Recorded) -> Router {
    Router::new()
        .route("/api/tags", get(move || async move { Json(json!({"models": models})) }))
        .route(
            "/api/pull",
            post(move |State(rec): State<Recorded>| async move {
                *rec.pulls.lock().unwrap() += 1;
                pull_body
            }),
        )
        .route(
            "/api/chat",
            post(|State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                *rec.chat_body.lock().unwrap() = Some(body);
                Json(json!({
                    "model": "llama2",
                    "message": {"role": "assistant", "content": "B1 passed its inspection."},
                    "done": true
                }))
            }),
        )
        .with_state(recorded)
}

fn client(url: &str) -> OllamaClient {
    OllamaClient::new(url, "llama2", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_models_and_availability() {
    let recorded = Recorded::default();
    let url = serve(fake_engine(json!([{"name": "llama2:latest"}]), "", recorded)).await;
    let engine = client(&url);

    assert_eq!(engine.list_models().await.unwrap(), vec!["llama2:latest".to_string()]);
    assert!(engine.check_availability().await);
}

#[tokio::test]
async fn test_ensure_model_present_skips_pull() {
    let recorded = Recorded::default();
    let url = serve(fake_engine(json!([{"name": "llama2:latest"}]), "", recorded.clone())).await;

    assert!(client(&url).ensure_model_available().await);
    assert_eq!(*recorded.pulls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_ensure_model_pulls_missing_model() {
    let recorded = Recorded::default();
    let pull_body = concat!(
        "{\"status\":\"pulling manifest\"}\n",
        "{\"status\":\"downloading\",\"completed\":10,\"total\":100}\n",
        "{\"status\":\"downloading\",\"completed\":100,\"total\":100}\n",
        "{\"status\":\"success\"}"
    );
    let models = json!([{"name": "mistral:7b"}]);
    let url = serve(fake_engine(models, pull_body, recorded.clone())).await;

    assert!(client(&url).ensure_model_available().await);
    assert_eq!(*recorded.pulls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_ensure_model_pull_error() {
    let recorded = Recorded::default();
    let pull_body = concat!(
        "{\"status\":\"pulling manifest\"}\n",
        "{\"error\":\"pull model manifest: file does not exist\"}\n"
    );
    let url = serve(fake_engine(json!([]), pull_body, recorded)).await;
    let engine = client(&url);

    assert!(!engine.ensure_model_available().await);
    assert!(matches!(engine.pull_model().await, Err(ClientError::Engine(_))));
}

#[tokio::test]
async fn test_pull_without_success_is_error() {
    let recorded = Recorded::default();
    let url = serve(fake_engine(json!([]), "{\"status\":\"pulling manifest\"}\n", recorded)).await;

    assert!(matches!(
        client(&url).pull_model().await,
        Err(ClientError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_generate_response_request_shape() {
    let recorded = Recorded::default();
    let url = serve(fake_engine(json!([]), "", recorded.clone())).await;

    let history = vec![
        ChatMessage::user("Which batches are mangoes?"),
        ChatMessage::assistant("B1."),
    ];
    let reply = client(&url)
        .generate_response("Did B1 pass?", Some("You are a traceability assistant."), &history, 0.7)
        .await
        .unwrap();
    assert_eq!(reply, "B1 passed its inspection.");

    let body = recorded.chat_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "llama2");
    assert_eq!(body["stream"], false);
    assert!((body["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "You are a traceability assistant."},
            {"role": "user", "content": "Which batches are mangoes?"},
            {"role": "assistant", "content": "B1."},
            {"role": "user", "content": "Did B1 pass?"}
        ])
    );
}

#[tokio::test]
async fn test_generate_response_engine_error() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "model 'llama2' not found, try pulling it first"})),
            )
        }),
    );
    let url = serve(app).await;

    let err = client(&url)
        .generate_response("hi", None, &[], 0.7)
        .await
        .unwrap_err();
    match err {
        ClientError::Status { status, context } => {
            assert_eq!(status, 404);
            assert!(context.contains("not found"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_response_error_payload() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { Json(json!({"error": "out of memory"})) }),
    );
    let url = serve(app).await;

    let err = client(&url)
        .generate_response("hi", None, &[], 0.7)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Engine(_)));
}

#[tokio::test]
async fn test_generate_response_timeout() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"message": {"role": "assistant", "content": "late"}}))
        }),
    );
    let url = serve(app).await;
    let engine = OllamaClient::new(&url, "llama2", Duration::from_millis(200)).unwrap();

    let err = engine.generate_response("hi", None, &[], 0.7).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }));
}

#[tokio::test]
async fn test_stalled_tags_times_out_quickly() {
    let app = Router::new().route(
        "/api/tags",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"models": [{"name": "llama2:latest"}]}))
        }),
    );
    let url = serve(app).await;
    let engine = OllamaClient::new(&url, "llama2", Duration::from_secs(120))
        .unwrap()
        .with_probe_timeout(Duration::from_millis(200));

    let start = std::time::Instant::now();
    assert!(!engine.check_availability().await);
    assert!(start.elapsed() < Duration::from_secs(2));

    assert!(matches!(engine.ping().await, Err(ClientError::Timeout { .. })));
}

#[tokio::test]
async fn test_unreachable_engine() {
    let engine = client("http://127.0.0.1:1");

    assert!(!engine.check_availability().await);
    assert!(!engine.ensure_model_available().await);
    assert!(engine.generate_response("hi", None, &[], 0.7).await.is_err());
}
