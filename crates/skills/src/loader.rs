use crate::mcp_registry::{McpRegistry, McpServerInfo};
use agent_skills_core::config::McpConfig;
use agent_skills_core::{Error, Result};
use secrecy::Secret;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

#[derive(Deserialize)]
struct McpServersFile {
    #[serde(rename = "mcpServers")]
    mcp_servers: HashMap<String, McpServerEntry>,
}

#[derive(Deserialize)]
struct McpServerEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    auth_token: Option<String>,
}

/// Load an `mcpServers` file (JSON or TOML) and register its servers.
///
/// Returns the number of servers registered. A missing file registers nothing.
pub async fn load_mcp_config(registry: &McpRegistry, path: &Path) -> Result<usize> {
    if !path.exists() {
        tracing::warn!("MCP config file not found at: {:?}", path);
        return Ok(0);
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| Error::internal(format!("Failed to read MCP config: {}", e)))?;

    let config: McpServersFile = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .map_err(|e| Error::internal(format!("Failed to parse MCP config (JSON): {}", e)))?
    } else {
        toml::from_str(&content)
            .map_err(|e| Error::internal(format!("Failed to parse MCP config (TOML): {}", e)))?
    };

    let mut registered = 0;
    for (name, entry) in config.mcp_servers {
        let Some(url) = entry.url else {
            // Only the HTTP transport is supported.
            tracing::warn!(
                server = %name,
                command = ?entry.command,
                "Skipping MCP server without an HTTP url"
            );
            continue;
        };

        let mut info = McpServerInfo::new(&name, url);
        if let Some(desc) = entry.description {
            info = info.with_description(desc);
        }
        if let Some(ms) = entry.timeout_ms {
            info = info.with_timeout(Duration::from_millis(ms));
        }
        if let Some(token) = entry.auth_token {
            info = info.with_auth_token(Secret::new(token));
        }

        registry.register(info)?;
        registered += 1;
    }

    Ok(registered)
}

/// Register the servers named by the application config.
///
/// The `mcpServers` file is loaded first; inline `servers` entries replace
/// file entries of the same name.
pub async fn register_from_config(registry: &McpRegistry, config: &McpConfig) -> Result<()> {
    if let Some(path) = &config.config_path {
        load_mcp_config(registry, Path::new(path)).await?;
    }

    for (name, server) in &config.servers {
        let mut info = McpServerInfo::new(name, &server.url);
        if let Some(ms) = server.timeout_ms {
            info = info.with_timeout(Duration::from_millis(ms));
        }
        if let Some(token) = &server.auth_token {
            info = info.with_auth_token(token.clone());
        }
        registry.register(info)?;
    }

    tracing::info!(servers = ?registry.server_names(), "MCP servers registered");
    Ok(())
}
