//! In-process MCP server for integration tests.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves fixed resources over MCP streamable HTTP.
///
/// Every `initialize` opens a new session (`session-test-1`, `session-test-2`, ...);
/// reads under any other session id get HTTP 404.
#[derive(Default)]
pub struct FakeMcpServer {
    /// URI to (mime type, text).
    resources: Mutex<HashMap<String, (String, String)>>,
    sse: bool,
    methods: Mutex<Vec<String>>,
    auth_headers: Mutex<Vec<Option<String>>>,
    sessions_opened: Mutex<usize>,
    current_session: Mutex<Option<String>>,
}

impl FakeMcpServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request as a `text/event-stream`.
    pub fn with_sse(mut self) -> Self {
        self.sse = true;
        self
    }

    /// Serve `content` as the JSON text of `uri`.
    pub fn with_json(self, uri: &str, content: Value) -> Self {
        self.with_content(uri, "application/json", &content.to_string())
    }

    pub fn with_text(self, uri: &str, text: &str) -> Self {
        self.with_content(uri, "text/plain", text)
    }

    pub fn with_content(self, uri: &str, mime_type: &str, text: &str) -> Self {
        self.resources
            .lock()
            .unwrap()
            .insert(uri.to_string(), (mime_type.to_string(), text.to_string()));
        self
    }

    /// Forget the open session, as a restarted server would.
    pub fn expire_sessions(&self) {
        *self.current_session.lock().unwrap() = None;
    }

    /// JSON-RPC methods received, in order.
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }

    /// Bind to an ephemeral port and return the endpoint URL.
    pub async fn spawn(self) -> (String, Arc<Self>) {
        let state = Arc::new(self);
        let app = Router::new().route("/mcp", post(handle)).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/mcp", addr), state)
    }

    fn reply(&self, message: Value) -> Response {
        if self.sse {
            let body = format!("event: message\ndata: {}\n\n", message);
            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        } else {
            Json(message).into_response()
        }
    }
}

/// An endpoint nothing listens on.
pub async fn unreachable_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/mcp", addr)
}

async fn handle(
    State(state): State<Arc<FakeMcpServer>>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let method = request["method"].as_str().unwrap_or_default().to_string();
    state.methods.lock().unwrap().push(method.clone());
    state.auth_headers.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let id = request["id"].clone();

    match method.as_str() {
        "initialize" => {
            let mut response = state.reply(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": { "resources": {} },
                    "serverInfo": { "name": "fake", "version": "0.0.0" }
                }
            }));
            let session = {
                let mut opened = state.sessions_opened.lock().unwrap();
                *opened += 1;
                format!("session-test-{}", opened)
            };
            response
                .headers_mut()
                .insert("mcp-session-id", session.parse().unwrap());
            *state.current_session.lock().unwrap() = Some(session);
            response
        }
        "notifications/initialized" => StatusCode::ACCEPTED.into_response(),
        "resources/read" => {
            let session = headers.get("mcp-session-id").and_then(|v| v.to_str().ok());
            let current = state.current_session.lock().unwrap().clone();
            if session.is_none() {
                return (StatusCode::BAD_REQUEST, "missing session").into_response();
            }
            if session != current.as_deref() {
                return (StatusCode::NOT_FOUND, "unknown session").into_response();
            }

            let uri = request["params"]["uri"].as_str().unwrap_or_default();
            let found = state.resources.lock().unwrap().get(uri).cloned();
            match found {
                Some((mime_type, text)) => state.reply(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": {
                        "contents": [{ "uri": uri, "mimeType": mime_type, "text": text }]
                    }
                })),
                None => state.reply(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32002, "message": "Resource not found", "data": { "uri": uri } }
                })),
            }
        }
        _ => state.reply(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": "Method not found" }
        })),
    }
}
