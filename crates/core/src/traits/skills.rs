//! Skill traits.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{
    AmountInput, BudgetDecision, TaskContext, ToolDefinition, ToolOutput, TrendQuery, TrendRecord,
};

/// Admission control for cost-incurring work.
#[async_trait]
pub trait BudgetGate: Send + Sync {
    /// Decide whether the agent can afford `amount_required` of `currency_or_asset`.
    ///
    /// Invalid input and oracle failures are errors, never a denial.
    async fn check_budget(
        &self,
        tenant_id: &str,
        agent_id: &str,
        amount_required: AmountInput,
        currency_or_asset: &str,
    ) -> Result<BudgetDecision>;
}

/// Maps a task to the external resources it needs.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Resource URI strings for the task, possibly empty.
    async fn get_required_resources(&self, context: Option<&TaskContext>) -> Result<Vec<String>>;
}

/// Source of structured trend records.
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Trend records matching the query, possibly empty.
    async fn fetch_trends(&self, query: &TrendQuery) -> Result<Vec<TrendRecord>>;
}

/// Tool interface exposing a skill to an agent runtime.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the unique name of the tool.
    fn name(&self) -> &str;

    /// Get the human-readable description.
    fn description(&self) -> &str;

    /// Get the JSON Schema for parameters.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value) -> Result<ToolOutput>;
}

/// Tool registry for managing available tools.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Register a new tool.
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()>;

    /// List all available tools.
    async fn list(&self) -> Result<Vec<ToolDefinition>>;

    /// Execute a tool by name with arguments.
    async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput>;
}
