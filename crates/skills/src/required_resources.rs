//! Resolution of the external resources a task needs.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use agent_skills_core::{
    config::ResourceConfig,
    traits::ResourceResolver,
    types::{ResourceUri, TaskContext},
    Error, Result,
};

/// Resolver backed by configured resource lists.
///
/// Precedence: resources the task declares itself, then the list configured
/// for its task type, then the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredResourceResolver {
    defaults: Vec<ResourceUri>,
    by_task_type: HashMap<String, Vec<ResourceUri>>,
}

impl ConfiguredResourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ResourceConfig) -> Result<Self> {
        let mut resolver = Self::new().with_defaults(config.default.iter().map(String::as_str))?;
        for (task_type, uris) in &config.by_task_type {
            resolver = resolver.with_task_type(task_type, uris.iter().map(String::as_str))?;
        }
        Ok(resolver)
    }

    pub fn with_defaults<'a>(mut self, uris: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        self.defaults = parse_all(uris)?;
        Ok(self)
    }

    /// Task types are matched case-insensitively.
    pub fn with_task_type<'a>(
        mut self,
        task_type: &str,
        uris: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        self.by_task_type
            .insert(task_type.to_lowercase(), parse_all(uris)?);
        Ok(self)
    }

    fn configured_for(&self, context: Option<&TaskContext>) -> &[ResourceUri] {
        context
            .and_then(|c| c.task_type.as_deref())
            .and_then(|t| self.by_task_type.get(&t.to_lowercase()))
            .unwrap_or(&self.defaults)
    }
}

#[async_trait]
impl ResourceResolver for ConfiguredResourceResolver {
    async fn get_required_resources(&self, context: Option<&TaskContext>) -> Result<Vec<String>> {
        let declared = context
            .map(|c| c.required_resources.as_slice())
            .unwrap_or_default();

        let uris = if declared.is_empty() {
            self.configured_for(context).to_vec()
        } else {
            parse_all(declared.iter().map(String::as_str))?
        };

        let mut seen = HashSet::new();
        let resolved: Vec<String> = uris
            .into_iter()
            .map(|u| u.to_string())
            .filter(|u| seen.insert(u.clone()))
            .collect();

        tracing::debug!(
            task_type = ?context.and_then(|c| c.task_type.as_deref()),
            count = resolved.len(),
            "Resolved required resources"
        );

        Ok(resolved)
    }
}

fn parse_all<'a>(uris: impl IntoIterator<Item = &'a str>) -> Result<Vec<ResourceUri>> {
    uris.into_iter()
        .map(|raw| {
            ResourceUri::parse(raw)
                .map_err(|e| Error::invalid_input(format!("required resource rejected: {}", e)))
        })
        .collect()
}
