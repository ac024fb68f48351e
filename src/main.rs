#![deny(unused)]
//! skillhost - runs one agent skill tool against the configured MCP servers.
//!
//! Configuration is read from the config directory and `SKILLS__*` environment
//! variables.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use agent_skills::{register_from_config, DefaultToolRegistry, McpRegistry, SkillSet};
use agent_skills_core::{
    config::AppConfig,
    traits::{ResourceClient, ToolRegistry},
    types::ToolOutput,
};
use agent_skills_governance::{
    configure_tracing, setup_metrics_recorder, AuditStore, AuditedBudgetGate, FileAuditStore,
    InMemoryAuditStore,
};

#[derive(Parser, Debug)]
#[command(name = "skillhost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding default.toml, {SKILLS_ENV}.toml and local.toml
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the registered tools and their parameter schemas
    List,
    /// Execute one tool and print its output as JSON
    Run {
        /// Tool name, e.g. budget_check
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(default_value = "{}", value_parser = parse_json)]
        args: serde_json::Value,
    },
}

fn parse_json(raw: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("arguments are not JSON: {}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    configure_tracing(&config.telemetry)?;

    tracing::info!("Starting skillhost v{}", env!("CARGO_PKG_VERSION"));

    let metrics = if config.telemetry.metrics_enabled {
        Some(setup_metrics_recorder()?)
    } else {
        None
    };

    // =========================================================================
    // MCP servers
    // =========================================================================
    let servers = Arc::new(McpRegistry::new());
    register_from_config(&servers, &config.mcp).await?;

    // =========================================================================
    // Skills & Tools
    // =========================================================================
    let audit: Arc<dyn AuditStore> = match &config.telemetry.audit_log {
        Some(path) => Arc::new(FileAuditStore::new(path)),
        None => Arc::new(InMemoryAuditStore::new()),
    };

    let client: Arc<dyn ResourceClient> = servers;
    let skills = SkillSet::from_config(&config, client)?;
    let audited = Arc::new(AuditedBudgetGate::new(skills.budget.clone(), audit));
    let skills = skills.with_budget_gate(audited);

    let tools = DefaultToolRegistry::new();
    tools.register_skills(&skills).await?;

    // =========================================================================
    // Dispatch
    // =========================================================================
    let output = match cli.command {
        Commands::List => serde_json::to_value(tools.list().await?)?,
        Commands::Run { tool, args } => match tools.execute(&tool, args).await {
            Ok(output) => serde_json::to_value(output)?,
            Err(e) => {
                tracing::warn!(tool = %tool, code = e.code(), error = %e, "Tool failed");
                let output = ToolOutput::error(e.to_string())
                    .with_data(serde_json::json!({ "error": e.code() }));
                serde_json::to_value(output)?
            }
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(handle) = metrics {
        eprintln!("{}", handle.render());
    }

    Ok(())
}
