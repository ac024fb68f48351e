//! Tool registry implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use agent_skills_core::{
    traits::{Tool, ToolRegistry},
    types::{ToolDefinition, ToolOutput},
    Error, Result,
};

use crate::builtin::{BudgetCheckTool, FetchTrendsTool, RequiredResourcesTool};
use crate::skillset::SkillSet;

/// Default tool registry using DashMap.
pub struct DefaultToolRegistry {
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl DefaultToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Register the three skill tools backed by `skills`.
    pub async fn register_skills(&self, skills: &SkillSet) -> Result<()> {
        self.register(Box::new(BudgetCheckTool::new(skills.budget.clone()))).await?;
        self.register(Box::new(RequiredResourcesTool::new(skills.resources.clone()))).await?;
        self.register(Box::new(FetchTrendsTool::new(skills.trends.clone()))).await?;
        Ok(())
    }
}

impl Default for DefaultToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRegistry for DefaultToolRegistry {
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        tracing::info!(tool = %name, "Registering tool");

        if self.tools.contains_key(&name) {
            return Err(Error::internal(format!("Tool '{}' is already registered", name)));
        }

        self.tools.insert(name, Arc::from(tool));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ToolDefinition>> {
        let mut definitions: Vec<_> = self
            .tools
            .iter()
            .map(|entry| ToolDefinition {
                name: entry.name().to_string(),
                description: entry.description().to_string(),
                parameters: entry.parameters(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(definitions)
    }

    async fn execute(&self, name: &str, args: serde_json::Value) -> Result<ToolOutput> {
        // Clone out of the map so no shard lock is held across the await.
        let tool = self
            .tools
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::tool_not_found(name))?;

        tracing::debug!(tool = %name, "Executing tool");

        tool.execute(args).await
    }
}
