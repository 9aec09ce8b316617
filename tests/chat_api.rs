use anyhow::anyhow;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use gemini_chat::api::{AppState, MAX_BODY_BYTES, build_router};
use gemini_chat::model::Generation;
use gemini_chat::model_gateway::{GenerateFuture, ModelGateway};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for `oneshot`

const INTERNAL_DETAIL: &str = "quota exceeded for project 1234 (key AIza-secret)";

#[derive(Debug, Clone)]
enum StubOutcome {
    Text(String),
    Empty,
    Fail,
}

struct StubGateway {
    calls: Mutex<Vec<String>>,
    outcome: StubOutcome,
}

impl StubGateway {
    fn new(outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcome,
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ModelGateway for StubGateway {
    fn model(&self) -> &str {
        "stub-model"
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a> {
        self.calls.lock().unwrap().push(prompt.to_string());
        let result = match &self.outcome {
            StubOutcome::Text(text) => Ok(Generation::Text(text.clone())),
            StubOutcome::Empty => Ok(Generation::empty(Some("SAFETY"))),
            StubOutcome::Fail => Err(anyhow!(INTERNAL_DETAIL)),
        };
        Box::pin(async move { result })
    }
}

fn app_with(stub: &Arc<StubGateway>) -> Router {
    build_router(AppState::new(stub.clone()))
}

fn json_chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/chat")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn chat_returns_model_text() {
    let stub = StubGateway::new(StubOutcome::Text("hi".to_string()));
    let response = app_with(&stub)
        .oneshot(json_chat_request(json!({"message": "hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"response": "hi"}));
    assert_eq!(stub.calls(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn chat_without_message_is_bad_request() {
    let stub = StubGateway::new(StubOutcome::Text("hi".to_string()));
    let app = app_with(&stub);

    for body in [json!({}), json!({"message": ""}), json!({"message": null}), json!([1, 2])] {
        let response = app.clone().oneshot(json_chat_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await, json!({"error": "Missing message"}));
    }
    assert!(stub.calls().is_empty(), "model must not be called");
}

#[tokio::test]
async fn chat_rejects_plain_text_body() {
    let stub = StubGateway::new(StubOutcome::Text("hi".to_string()));
    let req = Request::builder()
        .uri("/chat")
        .method("POST")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();

    let response = app_with(&stub).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(read_json(response).await, json!({"error": "Request must be JSON"}));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn chat_rejects_malformed_json_body() {
    let stub = StubGateway::new(StubOutcome::Text("hi".to_string()));
    let req = Request::builder()
        .uri("/chat")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"message\": "))
        .unwrap();

    let response = app_with(&stub).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(read_json(response).await, json!({"error": "Request must be JSON"}));
}

#[tokio::test]
async fn chat_hides_upstream_error_detail() {
    let stub = StubGateway::new(StubOutcome::Fail);
    let response = app_with(&stub)
        .oneshot(json_chat_request(json!({"message": "hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body, json!({"error": "An internal error occurred."}));
    assert!(!body.to_string().contains(INTERNAL_DETAIL));
    assert_eq!(stub.calls().len(), 1);
}

#[tokio::test]
async fn chat_reports_missing_model_text() {
    let stub = StubGateway::new(StubOutcome::Empty);
    let response = app_with(&stub)
        .oneshot(json_chat_request(json!({"message": "hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({"error": "Received an unexpected response from the model."})
    );
}

#[tokio::test]
async fn index_serves_html_without_calling_model() {
    let stub = StubGateway::new(StubOutcome::Fail);
    let req = Request::builder()
        .uri("/")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app_with(&stub).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"), "got {content_type}");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<html"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn chat_get_is_not_allowed() {
    let stub = StubGateway::new(StubOutcome::Text("hi".to_string()));
    let req = Request::builder()
        .uri("/chat")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app_with(&stub).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn repeated_chats_are_independent() {
    let stub = StubGateway::new(StubOutcome::Text("hi".to_string()));
    let app = app_with(&stub);

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(json_chat_request(json!({"message": "hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({"response": "hi"}));
    }
    assert_eq!(stub.calls().len(), 5);
}

#[tokio::test]
async fn chat_accepts_long_message_above_default_body_limit() {
    let stub = StubGateway::new(StubOutcome::Text("ok".to_string()));
    let long_message = "a".repeat(3 * 1024 * 1024);
    let response = app_with(&stub)
        .oneshot(json_chat_request(json!({"message": long_message})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"response": "ok"}));
    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), long_message.len());
}

#[tokio::test]
async fn chat_rejects_body_over_limit_as_too_large() {
    let stub = StubGateway::new(StubOutcome::Text("ok".to_string()));
    let oversized = "a".repeat(MAX_BODY_BYTES + 1);
    let response = app_with(&stub)
        .oneshot(json_chat_request(json!({"message": oversized})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(read_json(response).await, json!({"error": "Request body too large"}));
    assert!(stub.calls().is_empty());
}
