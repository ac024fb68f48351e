//! Stand-in MCP servers for end-to-end tests.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves a mutable map of URI to JSON content over MCP streamable HTTP.
#[derive(Default)]
pub struct ResourceServer {
    resources: Mutex<HashMap<String, Value>>,
    reads: Mutex<usize>,
}

impl ResourceServer {
    pub fn set(&self, uri: &str, content: Value) {
        self.resources.lock().unwrap().insert(uri.to_string(), content);
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

pub async fn spawn_resource_server() -> (String, Arc<ResourceServer>) {
    let state = Arc::new(ResourceServer::default());
    let app = Router::new().route("/mcp", post(handle)).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/mcp", addr), state)
}

pub async fn unreachable_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/mcp", addr)
}

async fn handle(State(state): State<Arc<ResourceServer>>, Json(request): Json<Value>) -> impl IntoResponse {
    let id = request["id"].clone();

    match request["method"].as_str() {
        Some("initialize") => (
            [("mcp-session-id", "e2e-session")],
            Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "protocolVersion": "2025-03-26", "capabilities": { "resources": {} } }
            })),
        )
            .into_response(),
        Some("notifications/initialized") => StatusCode::ACCEPTED.into_response(),
        Some("resources/read") => {
            *state.reads.lock().unwrap() += 1;
            let uri = request["params"]["uri"].as_str().unwrap_or_default();
            let found = state.resources.lock().unwrap().get(uri).cloned();
            let body = match found {
                Some(content) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": { "contents": [{ "uri": uri, "text": content.to_string() }] }
                }),
                None => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32002, "message": "Resource not found" }
                }),
            };
            Json(body).into_response()
        }
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}
