//! Built-in skill tools.
//!
//! Each tool adapts one skill trait to the JSON-in/JSON-out [`Tool`] interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use agent_skills_core::{
    traits::{BudgetGate, ResourceResolver, Tool, TrendSource},
    types::{AmountInput, TaskContext, TimeRange, ToolOutput, TrendQuery},
    Error, Result,
};

fn required_str<'a>(args: &'a Value, field: &str) -> Result<&'a str> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_input(format!("{} is required", field)))
}

fn optional_str<'a>(args: &'a Value, field: &str) -> Result<Option<&'a str>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(Error::invalid_input(format!("{} must be a string, got {}", field, other))),
    }
}

// =============================================================================
// Budget Check Tool
// =============================================================================

/// Tool exposing a [`BudgetGate`].
pub struct BudgetCheckTool {
    gate: Arc<dyn BudgetGate>,
}

impl BudgetCheckTool {
    pub fn new(gate: Arc<dyn BudgetGate>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl Tool for BudgetCheckTool {
    fn name(&self) -> &str {
        "budget_check"
    }

    fn description(&self) -> &str {
        "Check that an agent holds enough of a currency or asset before cost-incurring work"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tenant_id": { "type": "string", "description": "Owning organization" },
                "agent_id": { "type": "string", "description": "Acting agent within the tenant" },
                "amount_required": {
                    "type": ["string", "number"],
                    "description": "Non-negative amount; prefer an exact decimal string such as \"12.50\""
                },
                "currency_or_asset": { "type": "string", "description": "Currency code or asset id, e.g. USDC" }
            },
            "required": ["tenant_id", "agent_id", "amount_required", "currency_or_asset"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let tenant_id = required_str(&args, "tenant_id")?;
        let agent_id = required_str(&args, "agent_id")?;
        let currency = required_str(&args, "currency_or_asset")?;
        let amount = AmountInput::from_json(args.get("amount_required").unwrap_or(&Value::Null))?;

        let decision = self.gate.check_budget(tenant_id, agent_id, amount, currency).await?;

        let summary = match decision.reason() {
            None => format!(
                "Budget check passed: balance {} {} covers {}",
                decision.current_balance(),
                currency,
                decision.required()
            ),
            Some(reason) => format!(
                "Budget check denied ({}): balance {} {} is below {}",
                reason,
                decision.current_balance(),
                currency,
                decision.required()
            ),
        };

        Ok(ToolOutput::text(summary).with_data(serde_json::to_value(&decision)?))
    }
}

// =============================================================================
// Required Resources Tool
// =============================================================================

/// Tool exposing a [`ResourceResolver`].
pub struct RequiredResourcesTool {
    resolver: Arc<dyn ResourceResolver>,
}

impl RequiredResourcesTool {
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for RequiredResourcesTool {
    fn name(&self) -> &str {
        "get_required_resources"
    }

    fn description(&self) -> &str {
        "List the external resource URIs a task needs"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "context": {
                    "type": "object",
                    "description": "Optional task context",
                    "properties": {
                        "task_type": { "type": "string" },
                        "tenant_id": { "type": "string" },
                        "required_resources": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let context: Option<TaskContext> = match args.get("context") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value(raw.clone())
                    .map_err(|e| Error::invalid_input(format!("invalid task context: {}", e)))?,
            ),
        };

        let uris = self.resolver.get_required_resources(context.as_ref()).await?;

        Ok(ToolOutput::text(format!("{} required resource(s)", uris.len())).with_data(json!(uris)))
    }
}

// =============================================================================
// Fetch Trends Tool
// =============================================================================

/// Tool exposing a [`TrendSource`].
pub struct FetchTrendsTool {
    source: Arc<dyn TrendSource>,
}

impl FetchTrendsTool {
    pub fn new(source: Arc<dyn TrendSource>) -> Self {
        Self { source }
    }
}

fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::invalid_input(format!("{} is not an RFC 3339 timestamp: {}", field, e)))
}

#[async_trait]
impl Tool for FetchTrendsTool {
    fn name(&self) -> &str {
        "fetch_trends"
    }

    fn description(&self) -> &str {
        "Fetch current trend records, optionally for one tenant and time window"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tenant_id": { "type": "string" },
                "from": { "type": "string", "format": "date-time" },
                "to": { "type": "string", "format": "date-time" }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let mut query = TrendQuery::default();

        if let Some(tenant_id) = optional_str(&args, "tenant_id")? {
            query.tenant_id = Some(tenant_id.to_string());
        }

        match (optional_str(&args, "from")?, optional_str(&args, "to")?) {
            (None, None) => {}
            (Some(from), Some(to)) => {
                query = query.with_time_range(TimeRange::new(
                    parse_instant("from", from)?,
                    parse_instant("to", to)?,
                )?);
            }
            _ => return Err(Error::invalid_input("from and to must be given together")),
        }

        let trends = self.source.fetch_trends(&query).await?;

        Ok(ToolOutput::text(format!("{} trend(s)", trends.len())).with_data(json!(trends)))
    }
}
