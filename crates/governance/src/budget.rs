//! Audited budget gate.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use agent_skills_core::{
    traits::BudgetGate,
    types::{AmountInput, BudgetDecision},
    Result,
};

use crate::audit::{AuditEntry, AuditOutcome, AuditStore};
use crate::metrics::track_budget_check;

/// Decorates a [`BudgetGate`] with an audit trail and metrics.
///
/// Every check is recorded once. The inner gate's decision or error is
/// returned unchanged; a failing audit store is only logged.
pub struct AuditedBudgetGate {
    inner: Arc<dyn BudgetGate>,
    store: Arc<dyn AuditStore>,
}

impl AuditedBudgetGate {
    pub fn new(inner: Arc<dyn BudgetGate>, store: Arc<dyn AuditStore>) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl BudgetGate for AuditedBudgetGate {
    async fn check_budget(
        &self,
        tenant_id: &str,
        agent_id: &str,
        amount_required: AmountInput,
        currency_or_asset: &str,
    ) -> Result<BudgetDecision> {
        let started = Instant::now();
        let result = self
            .inner
            .check_budget(tenant_id, agent_id, amount_required, currency_or_asset)
            .await;
        let elapsed = started.elapsed().as_secs_f64();

        let (outcome, metadata) = match &result {
            Ok(decision) if decision.allowed() => (AuditOutcome::Allowed, serde_json::to_value(decision).ok()),
            Ok(decision) => (AuditOutcome::Denied, serde_json::to_value(decision).ok()),
            Err(e) => (
                AuditOutcome::Error(e.code().to_string()),
                Some(json!({ "message": e.to_string() })),
            ),
        };

        let label = match &outcome {
            AuditOutcome::Allowed => "allowed",
            AuditOutcome::Denied => "denied",
            AuditOutcome::Error(code) => code.as_str(),
        };
        track_budget_check(label, currency_or_asset, elapsed);

        let entry = AuditEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            tenant_id: tenant_id.to_string(),
            agent_id: agent_id.to_string(),
            action: "budget_check".to_string(),
            resource: currency_or_asset.to_string(),
            outcome,
            metadata,
        };

        if let Err(e) = self.store.log(entry).await {
            tracing::warn!(error = %e, tenant_id, agent_id, "Failed to record budget audit entry");
        }

        result
    }
}
