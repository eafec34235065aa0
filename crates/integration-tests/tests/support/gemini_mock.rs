#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model_call: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// In-process stand-in for the Gemini `generateContent` endpoint.
pub struct MockGeminiServer {
    pub base_url: String,
    state: MockState,
    handle: tokio::task::JoinHandle<()>,
}

impl MockGeminiServer {
    pub async fn start(replies: Vec<(StatusCode, Value)>) -> Self {
        let state = MockState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            calls: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v1beta/models/{model_call}", post(generate_content))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock gemini listener should bind");
        let bind_addr = listener
            .local_addr()
            .expect("mock gemini listener local address should exist");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock gemini server should run");
        });

        Self {
            base_url: format!("http://{bind_addr}/v1beta"),
            state,
            handle,
        }
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().await.clone()
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn text_reply(text: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 8,
                "totalTokenCount": 20
            },
            "modelVersion": "mock-model"
        }),
    )
}

pub fn error_reply(status: StatusCode, code: &str) -> (StatusCode, Value) {
    (
        status,
        json!({ "error": { "code": status.as_u16(), "status": code } }),
    )
}

async fn generate_content(
    State(state): State<MockState>,
    Path(model_call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.lock().await.push(RecordedCall {
        model_call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string),
        body,
    });

    let (status, body) = state
        .replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| error_reply(StatusCode::INTERNAL_SERVER_ERROR, "NO_REPLY_SCRIPTED"));
    (status, Json(body))
}
