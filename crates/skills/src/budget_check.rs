//! Budget check before cost-incurring workflows.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agent_skills_core::{
    config::BudgetConfig,
    traits::{BalanceOracle, BudgetGate},
    types::{AmountInput, BalanceQuery, BudgetDecision},
    Error, Result,
};

/// Budget gate answering from a single read of a balance oracle.
///
/// Stateless: nothing is cached between checks, and the oracle is never
/// retried. Callers own any retry policy.
pub struct OracleBudgetGate {
    oracle: Arc<dyn BalanceOracle>,
    timeout: Duration,
}

impl OracleBudgetGate {
    /// Create a gate with the default 2 second oracle timeout.
    pub fn new(oracle: Arc<dyn BalanceOracle>) -> Self {
        Self::from_config(oracle, &BudgetConfig::default())
    }

    pub fn from_config(oracle: Arc<dyn BalanceOracle>, config: &BudgetConfig) -> Self {
        Self {
            oracle,
            timeout: Duration::from_millis(config.oracle_timeout_ms),
        }
    }

    /// Set the bound on the oracle read.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl BudgetGate for OracleBudgetGate {
    async fn check_budget(
        &self,
        tenant_id: &str,
        agent_id: &str,
        amount_required: AmountInput,
        currency_or_asset: &str,
    ) -> Result<BudgetDecision> {
        let query = BalanceQuery::new(tenant_id, agent_id, currency_or_asset)?;
        let required = amount_required.parse()?;

        let started = Instant::now();
        let balance = match tokio::time::timeout(self.timeout, self.oracle.get_balance(&query)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    tenant_id = %query.tenant_id,
                    agent_id = %query.agent_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Balance oracle timed out"
                );
                return Err(Error::oracle_unavailable(format!(
                    "balance oracle did not answer within {:?}",
                    self.timeout
                )));
            }
        };

        let current = balance.current_balance;
        if current.is_sign_negative() && !current.is_zero() {
            return Err(Error::oracle_unavailable(format!(
                "balance oracle reported negative balance {}",
                current
            )));
        }

        let decision = BudgetDecision::evaluate(current, required);

        tracing::info!(
            tenant_id = %query.tenant_id,
            agent_id = %query.agent_id,
            currency = %query.currency_or_asset,
            required = %required,
            balance = %current,
            allowed = decision.allowed(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Budget checked"
        );

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_skills_core::mocks::MockBalanceOracle;
    use agent_skills_core::types::DenialReason;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn gate(oracle: MockBalanceOracle) -> (OracleBudgetGate, Arc<MockBalanceOracle>) {
        let oracle = Arc::new(oracle);
        (OracleBudgetGate::new(oracle.clone()), oracle)
    }

    #[tokio::test]
    async fn test_exact_balance_is_allowed() {
        let (gate, _) = gate(MockBalanceOracle::with_balance(dec!(100.00)));

        let decision = gate.check_budget("t1", "a1", "100".into(), "USDC").await.unwrap();

        assert!(decision.allowed());
        assert_eq!(decision.reason(), None);
        assert_eq!(decision.current_balance().to_string(), "100.00");
        assert_eq!(decision.required().to_string(), "100");
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_denied() {
        let (gate, _) = gate(MockBalanceOracle::with_balance(dec!(50.00)));

        let decision = gate.check_budget("t1", "a1", "100".into(), "USDC").await.unwrap();

        assert!(!decision.allowed());
        assert_eq!(decision.reason(), Some(DenialReason::InsufficientBalance));
    }

    #[tokio::test]
    async fn test_sub_cent_boundary_is_exact() {
        let (gate, _) = gate(MockBalanceOracle::with_balance(dec!(0.3)));

        // 0.1 + 0.2 in binary floating point is 0.30000000000000004.
        let decision = gate.check_budget("t1", "a1", AmountInput::from(0.3), "USDC").await.unwrap();
        assert!(decision.allowed());

        let decision = gate.check_budget("t1", "a1", "0.3000000001".into(), "USDC").await.unwrap();
        assert!(!decision.allowed());
    }

    #[tokio::test]
    async fn test_amounts_needing_rounding_are_rejected() {
        let (gate, oracle) = gate(MockBalanceOracle::with_balance(dec!(100)));
        let err = gate
            .check_budget("t1", "a1", "100.000000000000000000000000001".into(), "USDC")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let (zero_gate, _) = self::gate(MockBalanceOracle::with_balance(Decimal::ZERO));
        for amount in [AmountInput::from("0.00000000000000000000000000001"), AmountInput::from(1e-30)] {
            let err = zero_gate.check_budget("t1", "a1", amount, "USDC").await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "unexpected {:?}", err);
        }

        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_amount_always_allowed() {
        let (gate, oracle) = gate(MockBalanceOracle::with_balance(Decimal::ZERO));

        let decision = gate.check_budget("t1", "a1", 0u64.into(), "ETH").await.unwrap();

        assert!(decision.allowed());
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_oracle() {
        let (gate, oracle) = gate(MockBalanceOracle::with_balance(dec!(1000)));

        let cases: Vec<(&str, &str, AmountInput, &str)> = vec![
            ("", "a1", "1".into(), "USDC"),
            ("t1", "", "1".into(), "USDC"),
            ("t1", "a1", "1".into(), ""),
            ("t1", "a1", "-1".into(), "USDC"),
            ("t1", "a1", "ten".into(), "USDC"),
            ("t1", "a1", f64::NAN.into(), "USDC"),
        ];

        for (tenant, agent, amount, asset) in cases {
            let err = gate.check_budget(tenant, agent, amount, asset).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "unexpected {:?}", err);
        }
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_not_a_denial() {
        let (gate, _) = gate(MockBalanceOracle::unavailable());
        let err = gate.check_budget("t1", "a1", "1".into(), "USDC").await.unwrap_err();
        assert!(matches!(err, Error::OracleUnavailable(_)));

        let (gate, _) = self::gate(MockBalanceOracle::unknown_asset());
        let err = gate.check_budget("t1", "a1", "1".into(), "XYZ").await.unwrap_err();
        assert!(matches!(err, Error::UnknownAsset(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oracle_timeout() {
        let oracle = Arc::new(
            MockBalanceOracle::with_balance(dec!(100)).with_delay(Duration::from_secs(30)),
        );
        let gate = OracleBudgetGate::new(oracle.clone()).with_timeout(Duration::from_millis(500));

        let err = gate.check_budget("t1", "a1", "1".into(), "USDC").await.unwrap_err();

        assert!(matches!(err, Error::OracleUnavailable(_)));
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_queries_oracle_once_with_inputs() {
        let (gate, oracle) = gate(MockBalanceOracle::with_balance(dec!(5)));

        gate.check_budget("t1", "a1", "1".into(), "USDC").await.unwrap();

        let queries = oracle.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0], BalanceQuery::new("t1", "a1", "USDC").unwrap());
    }

    #[tokio::test]
    async fn test_no_caching_between_checks() {
        let (gate, oracle) = gate(MockBalanceOracle::with_balance(dec!(5)));

        gate.check_budget("t1", "a1", "1".into(), "USDC").await.unwrap();
        gate.check_budget("t1", "a1", "1".into(), "USDC").await.unwrap();

        assert_eq!(oracle.call_count(), 2);
    }
}
