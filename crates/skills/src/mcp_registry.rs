//! MCP server registry.
//!
//! Maps server names to resource clients so that a resource URI such as
//! `mcp://wallet_commerce/...` is resolved at the boundary by its authority
//! instead of being bound to a hard-coded endpoint.

use async_trait::async_trait;
use dashmap::DashMap;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agent_skills_core::{traits::ResourceClient, types::ResourceUri, Error, Result};
use agent_skills_governance::metrics::track_resource_read;

use crate::mcp_adapter::McpHttpClient;

/// Default bound on one HTTP exchange with an MCP server.
pub const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Information about a registered MCP server.
#[derive(Debug, Clone)]
pub struct McpServerInfo {
    /// Server name; matches the authority of the URIs it serves.
    pub name: String,
    /// Server description.
    pub description: String,
    /// HTTP endpoint.
    pub url: String,
    /// Bound on one HTTP exchange.
    pub timeout: Duration,
    /// Bearer token, if the server requires one.
    pub auth_token: Option<Secret<String>>,
}

impl McpServerInfo {
    /// Create a new MCP server info entry.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            url: url.into(),
            timeout: DEFAULT_SERVER_TIMEOUT,
            auth_token: None,
        }
    }

    /// Set description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set the per-exchange timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bearer token.
    pub fn with_auth_token(mut self, token: Secret<String>) -> Self {
        self.auth_token = Some(token);
        self
    }
}

/// Registry of MCP servers, itself usable as a [`ResourceClient`].
pub struct McpRegistry {
    servers: DashMap<String, McpServerInfo>,
    clients: DashMap<String, Arc<dyn ResourceClient>>,
}

impl McpRegistry {
    /// Create a new MCP registry.
    pub fn new() -> Self {
        Self {
            servers: DashMap::new(),
            clients: DashMap::new(),
        }
    }

    /// Register an HTTP MCP server. Re-registering a name replaces it.
    pub fn register(&self, server: McpServerInfo) -> Result<()> {
        tracing::info!(name = %server.name, url = %server.url, "Registering MCP server");

        let mut client = McpHttpClient::new(&server.name, &server.url, server.timeout)?;
        if let Some(token) = &server.auth_token {
            client = client.with_auth_token(token.clone());
        }

        self.clients.insert(server.name.clone(), Arc::new(client));
        self.servers.insert(server.name.clone(), server);
        Ok(())
    }

    /// Register any resource client under `name`.
    pub fn register_client(&self, name: impl Into<String>, client: Arc<dyn ResourceClient>) {
        let name = name.into();
        tracing::info!(name = %name, "Registering resource client");
        self.servers.remove(&name);
        self.clients.insert(name, client);
    }

    /// Unregister a server.
    pub fn unregister(&self, name: &str) -> Option<McpServerInfo> {
        self.clients.remove(name);
        self.servers.remove(name).map(|(_, v)| v)
    }

    /// Whether a client is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.clients.contains_key(name)
    }

    /// Names of all registered clients, sorted.
    pub fn server_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// HTTP servers registered through [`McpRegistry::register`].
    pub fn list_all(&self) -> Vec<McpServerInfo> {
        self.servers.iter().map(|e| e.value().clone()).collect()
    }
}

impl Default for McpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceClient for McpRegistry {
    async fn read_resource(&self, uri: &ResourceUri) -> Result<Value> {
        // Clone the Arc out so no map guard is held across the await.
        let client = self
            .clients
            .get(uri.server())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                Error::resource_unavailable(format!("{}: no MCP server named '{}' is registered", uri, uri.server()))
            })?;

        let started = Instant::now();
        let result = client.read_resource(uri).await;
        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.code(),
        };
        track_resource_read(uri.server(), status, started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            tracing::warn!(server = %uri.server(), uri = %uri, error = %e, "Resource read failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_skills_core::mocks::MockResourceClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_by_server_name() {
        let registry = McpRegistry::new();
        registry.register_client(
            "news",
            Arc::new(MockResourceClient::new().with_resource("mcp://news/trends", json!([]))),
        );
        registry.register_client(
            "wallet_commerce",
            Arc::new(MockResourceClient::new().with_resource("mcp://wallet_commerce/b", json!({"balance": "1"}))),
        );

        let uri = ResourceUri::parse("mcp://wallet_commerce/b").unwrap();
        assert_eq!(registry.read_resource(&uri).await.unwrap(), json!({"balance": "1"}));

        let uri = ResourceUri::parse("mcp://news/trends").unwrap();
        assert_eq!(registry.read_resource(&uri).await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_unknown_server_is_unavailable() {
        let registry = McpRegistry::new();
        let uri = ResourceUri::parse("mcp://nowhere/x").unwrap();

        // Only the owning server may say a resource does not exist.
        let err = registry.read_resource(&uri).await.unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable(_)), "unexpected {:?}", err);
    }

    #[test]
    fn test_register_and_unregister() {
        let registry = McpRegistry::new();
        registry
            .register(
                McpServerInfo::new("news", "http://127.0.0.1:9/mcp")
                    .with_description("News and trends")
                    .with_timeout(Duration::from_millis(250)),
            )
            .unwrap();

        assert!(registry.contains("news"));
        assert_eq!(registry.list_all()[0].timeout, Duration::from_millis(250));

        let removed = registry.unregister("news").unwrap();
        assert_eq!(removed.description, "News and trends");
        assert!(registry.server_names().is_empty());
    }

    #[test]
    fn test_register_rejects_bad_url() {
        let registry = McpRegistry::new();
        assert!(registry.register(McpServerInfo::new("bad", "::::")).is_err());
        assert!(!registry.contains("bad"));
    }
}
