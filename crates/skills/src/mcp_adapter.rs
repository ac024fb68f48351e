//! MCP (Model Context Protocol) client for reading resources from external servers.
//!
//! Speaks JSON-RPC 2.0 over the streamable HTTP transport. Only the pieces
//! needed for resource reads are implemented: the `initialize` handshake and
//! `resources/read`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use agent_skills_core::{traits::ResourceClient, types::ResourceUri, Error, Result};

/// MCP protocol revision sent during `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Header carrying the server-assigned session id.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// JSON-RPC error code MCP servers use for unknown resources.
pub const RESOURCE_NOT_FOUND_CODE: i64 = -32002;

const CLIENT_NAME: &str = "agent-skills";

/// Handshake state; `id` is `None` when the server is stateless.
#[derive(Debug, Clone)]
struct Session {
    id: Option<String>,
}

/// Resource client for one MCP server reachable over HTTP.
#[derive(Debug)]
pub struct McpHttpClient {
    name: String,
    endpoint: Url,
    http: reqwest::Client,
    auth_token: Option<Secret<String>>,
    /// `None` until `initialize` has run.
    session: Mutex<Option<Session>>,
    next_id: AtomicU64,
}

impl McpHttpClient {
    /// Create a client for the server `name` at `endpoint`.
    ///
    /// Every HTTP exchange is bounded by `timeout`.
    pub fn new(name: impl Into<String>, endpoint: &str, timeout: Duration) -> Result<Self> {
        let name = name.into();
        let endpoint = Url::parse(endpoint).map_err(|e| {
            Error::invalid_input(format!("MCP server '{}' has invalid URL '{}': {}", name, endpoint, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name,
            endpoint,
            http,
            auth_token: None,
            session: Mutex::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    /// Send `token` as a bearer credential on every request.
    pub fn with_auth_token(mut self, token: Secret<String>) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, method: &str, params: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        })
    }

    async fn send(&self, body: &Value, session: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json, text/event-stream")
            .json(body);

        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token.expose_secret());
        }
        if let Some(id) = session {
            req = req.header(SESSION_HEADER, id);
        }

        req.send().await.map_err(|e| {
            let kind = if e.is_timeout() { "timed out" } else { "unreachable" };
            Error::resource_unavailable(format!("MCP server '{}' {}: {}", self.name, kind, e))
        })
    }

    fn ensure_success(&self, resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::resource_unavailable(format!(
                "MCP server '{}' answered HTTP {}",
                self.name, status
            )));
        }
        Ok(resp)
    }

    async fn post(&self, body: &Value, session: Option<&str>) -> Result<reqwest::Response> {
        let resp = self.send(body, session).await?;
        self.ensure_success(resp)
    }

    /// Perform the `initialize` handshake unless a session is already open.
    async fn session(&self) -> Result<Option<String>> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.id.clone());
        }

        let id = self.initialize().await?;
        *guard = Some(Session { id: id.clone() });
        Ok(id)
    }

    /// Forget `stale` so the next read performs a fresh handshake.
    async fn expire_session(&self, stale: Option<&str>) {
        let mut guard = self.session.lock().await;
        if guard.as_ref().is_some_and(|s| s.id.as_deref() == stale) {
            *guard = None;
        }
    }

    async fn send_read(&self, uri: &ResourceUri, session: Option<&str>) -> Result<(Value, reqwest::Response)> {
        let body = self.request("resources/read", json!({ "uri": uri.as_str() }));
        let resp = self.send(&body, session).await?;
        Ok((body["id"].clone(), resp))
    }

    async fn initialize(&self) -> Result<Option<String>> {
        tracing::info!(server = %self.name, endpoint = %self.endpoint, "Initializing MCP session");

        let body = self.request(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": CLIENT_NAME, "version": env!("CARGO_PKG_VERSION") },
            }),
        );

        let resp = self.post(&body, None).await?;
        let session = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let message = read_message(resp, &body["id"]).await?;
        into_result(message, &self.name)?;

        let initialized = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
        self.post(&initialized, session.as_deref()).await?;

        tracing::debug!(server = %self.name, session = ?session, "MCP session ready");
        Ok(session)
    }
}

#[async_trait]
impl ResourceClient for McpHttpClient {
    async fn read_resource(&self, uri: &ResourceUri) -> Result<Value> {
        let session = self.session().await?;

        tracing::debug!(server = %self.name, uri = %uri, "Reading MCP resource");

        let (mut id, mut resp) = self.send_read(uri, session.as_deref()).await?;

        // A server that no longer knows the session answers 404; renew it once.
        if resp.status() == reqwest::StatusCode::NOT_FOUND && session.is_some() {
            tracing::info!(server = %self.name, "MCP session expired, re-initializing");
            self.expire_session(session.as_deref()).await;
            let renewed = self.session().await?;
            (id, resp) = self.send_read(uri, renewed.as_deref()).await?;
        }

        let resp = self.ensure_success(resp)?;
        let result = into_result(read_message(resp, &id).await?, uri.as_str())?;

        let first = result
            .get("contents")
            .and_then(Value::as_array)
            .and_then(|contents| contents.first())
            .ok_or_else(|| Error::malformed_resource(format!("'{}' returned no contents", uri)))?;

        let Some(text) = first.get("text").and_then(Value::as_str) else {
            return Err(Error::malformed_resource(format!(
                "'{}' returned non-text contents",
                uri
            )));
        };

        let declared_json = first
            .get("mimeType")
            .and_then(Value::as_str)
            .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"));

        match serde_json::from_str(text) {
            Ok(value) => Ok(value),
            Err(e) if declared_json => Err(Error::malformed_resource(format!(
                "'{}' declared JSON content that does not parse: {}",
                uri, e
            ))),
            // Untyped or plain text is still a valid resource.
            Err(_) => Ok(Value::String(text.to_string())),
        }
    }
}

/// Read the JSON-RPC response with the given id from a JSON or SSE body.
async fn read_message(resp: reqwest::Response, id: &Value) -> Result<Value> {
    let is_sse = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/event-stream"));

    let text = resp
        .text()
        .await
        .map_err(|e| Error::resource_unavailable(format!("Failed to read MCP response: {}", e)))?;

    if !is_sse {
        return serde_json::from_str(&text)
            .map_err(|e| Error::mcp_protocol(format!("Response is not JSON: {}", e)));
    }

    text.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .filter_map(|data| serde_json::from_str::<Value>(data.trim()).ok())
        .find(|message| message.get("id") == Some(id))
        .ok_or_else(|| Error::mcp_protocol(format!("Event stream carried no response for id {}", id)))
}

/// Split a JSON-RPC response into its result or a typed error.
fn into_result(message: Value, context: &str) -> Result<Value> {
    if let Some(error) = message.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let detail = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");

        if code == RESOURCE_NOT_FOUND_CODE {
            return Err(Error::resource_not_found(context));
        }
        return Err(Error::mcp_protocol(format!("{} (code {}): {}", context, code, detail)));
    }

    message
        .get("result")
        .cloned()
        .ok_or_else(|| Error::mcp_protocol(format!("{}: response has neither result nor error", context)))
}
