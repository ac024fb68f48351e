use std::collections::HashMap;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

/// Default URI template for balance reads on the wallet/commerce service.
pub const DEFAULT_BALANCE_URI_TEMPLATE: &str =
    "mcp://wallet_commerce/tenants/{tenant_id}/agents/{agent_id}/balances/{currency_or_asset}";

/// Default trends resource on the news service.
pub const DEFAULT_TRENDS_URI: &str = "mcp://news/trends";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub budget: BudgetConfig,
    pub resources: ResourceConfig,
    pub trends: TrendConfig,
    pub mcp: McpConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BudgetConfig {
    /// Upper bound on the single balance read, in milliseconds.
    pub oracle_timeout_ms: u64,
    /// Template with `{tenant_id}`, `{agent_id}` and `{currency_or_asset}` placeholders.
    pub balance_uri_template: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ResourceConfig {
    /// Resources every task needs when nothing more specific applies.
    pub default: Vec<String>,
    /// Resources keyed by task type (e.g. `trend_analysis`).
    pub by_task_type: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrendConfig {
    pub resource_uri: String,
    pub timeout_ms: u64,
    pub max_records: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct McpConfig {
    /// Optional `mcpServers` file (JSON or TOML).
    pub config_path: Option<String>,
    pub servers: HashMap<String, McpServerConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct McpServerConfig {
    pub url: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub auth_token: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_filter: String,
    pub json_logs: bool,
    pub service_name: String,
    pub metrics_enabled: bool,
    /// JSON-lines audit log for budget checks; kept in memory when unset.
    pub audit_log: Option<String>,
}

impl AppConfig {
    /// Load layered configuration from `config/` in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Load layered configuration from the given directory.
    ///
    /// Layers, lowest precedence first: `default`, `{SKILLS_ENV}`, `local`,
    /// then `SKILLS__SECTION__KEY` environment variables.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let env = std::env::var("SKILLS_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(&env)).required(false))
            .add_source(File::from(dir.join("local")).required(false))
            // Map SKILLS__BUDGET__ORACLE_TIMEOUT_MS=500 to budget.oracle_timeout_ms
            .add_source(Environment::with_prefix("SKILLS").prefix_separator("__").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            oracle_timeout_ms: 2000,
            balance_uri_template: DEFAULT_BALANCE_URI_TEMPLATE.into(),
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            resource_uri: DEFAULT_TRENDS_URI.into(),
            timeout_ms: 5000,
            max_records: None,
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            config_path: Some("config/mcp-servers.json".into()),
            servers: HashMap::new(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: "info,agent_skills=debug".into(),
            json_logs: false,
            service_name: "agent-skills".into(),
            metrics_enabled: false,
            audit_log: None,
        }
    }
}
