//! Error types for the agent skills.

use thiserror::Error;

/// Result type alias using the skills' Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the agent skills.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Budget Gate Errors
    // =========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Balance oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Malformed resource content: {0}")]
    MalformedResource(String),

    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    // =========================================================================
    // Tool Errors
    // =========================================================================
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an oracle unavailable error.
    pub fn oracle_unavailable(msg: impl Into<String>) -> Self {
        Self::OracleUnavailable(msg.into())
    }

    /// Create an unknown asset error.
    pub fn unknown_asset(asset: impl Into<String>) -> Self {
        Self::UnknownAsset(asset.into())
    }

    /// Create a resource not found error.
    pub fn resource_not_found(uri: impl Into<String>) -> Self {
        Self::ResourceNotFound(uri.into())
    }

    /// Create a resource unavailable error.
    pub fn resource_unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Create a malformed resource error.
    pub fn malformed_resource(msg: impl Into<String>) -> Self {
        Self::MalformedResource(msg.into())
    }

    /// Create an MCP protocol error.
    pub fn mcp_protocol(msg: impl Into<String>) -> Self {
        Self::McpProtocol(msg.into())
    }

    /// Create a tool not found error.
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound(name.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::OracleUnavailable(_) => "oracle_unavailable",
            Self::UnknownAsset(_) => "unknown_asset",
            Self::ResourceNotFound(_) => "resource_not_found",
            Self::ResourceUnavailable(_) => "resource_unavailable",
            Self::MalformedResource(_) => "malformed_resource",
            Self::McpProtocol(_) => "mcp_protocol",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) | Self::Other(_) => "internal",
        }
    }
}
