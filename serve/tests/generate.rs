//! End-to-end: bind 127.0.0.1:0, serve with a mock model, call `/generate` over HTTP.

use std::sync::Arc;

use serve::{run_serve_on_listener, ErrorBody, GenerateResponse};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use weft::{LlmClient, MockLlm};

struct Server {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl Server {
    async fn start(llm: Arc<dyn LlmClient>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/generate", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            run_serve_on_listener(listener, llm, Some(rx)).await.unwrap();
        });
        Self {
            url,
            shutdown: Some(tx),
            handle,
        }
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap();
    }
}

/// **Scenario**: `{input}` is sent to the model and its reply comes back as `{message}`.
#[tokio::test]
async fn generate_returns_model_message() {
    let server = Server::start(Arc::new(MockLlm::echo())).await;
    let resp = reqwest::Client::new()
        .post(&server.url)
        .json(&serde_json::json!({ "input": "hello there" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: GenerateResponse = resp.json().await.unwrap();
    assert_eq!(body.message, "hello there");
    server.stop().await;
}

/// **Scenario**: a body without `input` is a 400 with an `error` field.
#[tokio::test]
async fn missing_input_is_bad_request() {
    let server = Server::start(Arc::new(MockLlm::new("unused"))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(&server.url)
        .json(&serde_json::json!({ "prompt": "wrong key" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.error.contains("input"));

    let resp = client
        .post(&server.url)
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(!body.error.is_empty());

    server.stop().await;
}

/// **Scenario**: a failing model is reported as 502 with the error text.
#[tokio::test]
async fn model_failure_is_bad_gateway() {
    let server = Server::start(Arc::new(MockLlm::scripted(vec![]))).await;
    let resp = reqwest::Client::new()
        .post(&server.url)
        .json(&serde_json::json!({ "input": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.error.contains("script is empty"));
    server.stop().await;
}
