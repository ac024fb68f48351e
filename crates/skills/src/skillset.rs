//! Wiring of the three skills from configuration.

use std::sync::Arc;
use std::time::Duration;

use agent_skills_core::{
    config::{AppConfig, BudgetConfig, ResourceConfig, TrendConfig},
    traits::{BalanceOracle, BudgetGate, ResourceClient, ResourceResolver, TrendSource},
    Result,
};

use crate::budget_check::OracleBudgetGate;
use crate::required_resources::ConfiguredResourceResolver;
use crate::trend_fetcher::McpTrendSource;
use crate::wallet_oracle::WalletBalanceOracle;

/// The budget gate, resource resolver and trend source an agent runtime uses.
#[derive(Clone)]
pub struct SkillSet {
    pub budget: Arc<dyn BudgetGate>,
    pub resources: Arc<dyn ResourceResolver>,
    pub trends: Arc<dyn TrendSource>,
}

impl SkillSet {
    pub fn builder(client: Arc<dyn ResourceClient>) -> SkillSetBuilder {
        SkillSetBuilder {
            client,
            budget: BudgetConfig::default(),
            resources: ResourceConfig::default(),
            trends: TrendConfig::default(),
            oracle: None,
        }
    }

    /// Build every skill over one resource client, as configured.
    pub fn from_config(config: &AppConfig, client: Arc<dyn ResourceClient>) -> Result<Self> {
        Self::builder(client).with_config(config).build()
    }

    /// Replace the budget gate, e.g. with an audited decorator.
    pub fn with_budget_gate(mut self, gate: Arc<dyn BudgetGate>) -> Self {
        self.budget = gate;
        self
    }
}

/// Builder for [`SkillSet`].
pub struct SkillSetBuilder {
    client: Arc<dyn ResourceClient>,
    budget: BudgetConfig,
    resources: ResourceConfig,
    trends: TrendConfig,
    oracle: Option<Arc<dyn BalanceOracle>>,
}

impl SkillSetBuilder {
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.budget = config.budget.clone();
        self.resources = config.resources.clone();
        self.trends = config.trends.clone();
        self
    }

    /// Use `oracle` instead of reading balances through the resource client.
    pub fn with_oracle(mut self, oracle: Arc<dyn BalanceOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn build(self) -> Result<SkillSet> {
        let oracle = match self.oracle {
            Some(oracle) => oracle,
            None => Arc::new(WalletBalanceOracle::new(
                self.client.clone(),
                self.budget.balance_uri_template.clone(),
            )?),
        };

        let gate = OracleBudgetGate::new(oracle)
            .with_timeout(Duration::from_millis(self.budget.oracle_timeout_ms));

        Ok(SkillSet {
            budget: Arc::new(gate),
            resources: Arc::new(ConfiguredResourceResolver::from_config(&self.resources)?),
            trends: Arc::new(McpTrendSource::from_config(self.client, &self.trends)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp_registry::McpRegistry;
    use agent_skills_core::mocks::MockResourceClient;
    use agent_skills_core::types::TaskContext;
    use agent_skills_core::Error;
    use serde_json::json;

    #[tokio::test]
    async fn test_from_config_reads_balance_through_client() {
        let client = Arc::new(MockResourceClient::new().with_resource(
            "mcp://wallet_commerce/tenants/t1/agents/a1/balances/USDC",
            json!({"balance": "100.00"}),
        ));

        let mut config = AppConfig::default();
        config.resources.by_task_type.insert("trend_analysis".into(), vec!["mcp://news/trends".into()]);

        let skills = SkillSet::from_config(&config, client).unwrap();

        let decision = skills.budget.check_budget("t1", "a1", "100".into(), "USDC").await.unwrap();
        assert!(decision.allowed());

        let ctx = TaskContext::for_task_type("trend_analysis");
        let uris = skills.resources.get_required_resources(Some(&ctx)).await.unwrap();
        assert_eq!(uris, vec!["mcp://news/trends"]);
    }

    #[tokio::test]
    async fn test_no_wallet_server_is_unavailable_not_denied() {
        let skills = SkillSet::from_config(&AppConfig::default(), Arc::new(McpRegistry::new())).unwrap();

        let err = skills.budget.check_budget("t1", "a1", "100".into(), "USDC").await.unwrap_err();

        assert!(matches!(err, Error::OracleUnavailable(_)), "unexpected {:?}", err);
    }

    #[test]
    fn test_bad_template_fails_build() {
        let mut config = AppConfig::default();
        config.budget.balance_uri_template = "mcp://wallet/{tenant_id}".into();

        assert!(SkillSet::from_config(&config, Arc::new(MockResourceClient::new())).is_err());
    }
}
