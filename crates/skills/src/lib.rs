#![deny(unused)]
//! Agent skills: budget check, required resources and trend fetching.
//!
//! This crate provides:
//! - The budget gate and its MCP-backed balance oracle
//! - Resource resolution and trend fetching over MCP resources
//! - An MCP streamable-HTTP client and a server registry that routes by URI
//! - Tool wrappers and a registry exposing the skills to an agent runtime

pub mod budget_check;
pub mod builtin;
pub mod loader;
pub mod mcp_adapter;
pub mod mcp_registry;
pub mod registry;
pub mod required_resources;
pub mod skillset;
pub mod trend_fetcher;
pub mod wallet_oracle;

pub use budget_check::OracleBudgetGate;
pub use builtin::{BudgetCheckTool, FetchTrendsTool, RequiredResourcesTool};
pub use loader::{load_mcp_config, register_from_config};
pub use mcp_adapter::McpHttpClient;
pub use mcp_registry::{McpRegistry, McpServerInfo};
pub use registry::DefaultToolRegistry;
pub use required_resources::ConfiguredResourceResolver;
pub use skillset::{SkillSet, SkillSetBuilder};
pub use trend_fetcher::McpTrendSource;
pub use wallet_oracle::WalletBalanceOracle;
