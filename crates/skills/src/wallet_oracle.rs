//! Balance oracle backed by the wallet/commerce MCP server.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

use agent_skills_core::{
    traits::{BalanceOracle, ResourceClient},
    types::{parse_decimal, BalanceQuery, BalanceResult, ResourceUri},
    Error, Result,
};

const PLACEHOLDERS: [&str; 3] = ["{tenant_id}", "{agent_id}", "{currency_or_asset}"];

/// Reads balances from a URI-addressed wallet resource.
///
/// The resource is expected to hold `{"balance": "<decimal>"}`. Balances should
/// be sent as strings; JSON numbers are accepted but lose trailing zeros.
pub struct WalletBalanceOracle {
    resources: Arc<dyn ResourceClient>,
    template: String,
}

impl WalletBalanceOracle {
    /// Create an oracle reading `template` with its placeholders filled in.
    pub fn new(resources: Arc<dyn ResourceClient>, template: impl Into<String>) -> Result<Self> {
        let template = template.into();

        if let Some(missing) = PLACEHOLDERS.iter().find(|p| !template.contains(*p)) {
            return Err(Error::invalid_input(format!(
                "balance URI template '{}' lacks {}",
                template, missing
            )));
        }

        let oracle = Self { resources, template };
        // Fail at construction rather than on the first check.
        oracle.balance_uri(&BalanceQuery::new("tenant", "agent", "asset")?)?;
        Ok(oracle)
    }

    /// The resource URI holding the balance for `query`.
    pub fn balance_uri(&self, query: &BalanceQuery) -> Result<ResourceUri> {
        let raw = self
            .template
            .replace("{tenant_id}", &urlencoding::encode(&query.tenant_id))
            .replace("{agent_id}", &urlencoding::encode(&query.agent_id))
            .replace("{currency_or_asset}", &urlencoding::encode(&query.currency_or_asset));
        ResourceUri::parse(&raw)
    }

    fn interpret(content: &Value, query: &BalanceQuery) -> Result<BalanceResult> {
        if let Some(code) = content.get("error").and_then(Value::as_str) {
            if code == "unknown_asset" {
                return Err(Error::unknown_asset(query.currency_or_asset.clone()));
            }
            return Err(Error::oracle_unavailable(format!("wallet reported error '{}'", code)));
        }

        let raw = match content {
            Value::Object(map) => map.get("balance").cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };

        let balance = match &raw {
            Value::Null => Decimal::ZERO,
            Value::String(s) => parse_decimal(s)
                .map_err(|_| Error::oracle_unavailable(format!("wallet balance '{}' is not a decimal", s)))?,
            Value::Number(n) => parse_decimal(&n.to_string())
                .map_err(|_| Error::oracle_unavailable(format!("wallet balance {} is out of range", n)))?,
            other => {
                return Err(Error::oracle_unavailable(format!(
                    "wallet balance has unexpected shape: {}",
                    other
                )))
            }
        };

        if balance.is_sign_negative() && !balance.is_zero() {
            return Err(Error::oracle_unavailable(format!("wallet reported negative balance {}", balance)));
        }

        Ok(BalanceResult::new(balance))
    }
}

#[async_trait]
impl BalanceOracle for WalletBalanceOracle {
    async fn get_balance(&self, query: &BalanceQuery) -> Result<BalanceResult> {
        let uri = self.balance_uri(query)?;

        match self.resources.read_resource(&uri).await {
            Ok(content) => Self::interpret(&content, query),
            Err(Error::ResourceNotFound(_)) => {
                tracing::debug!(uri = %uri, "No holdings record, treating balance as zero");
                Ok(BalanceResult::zero())
            }
            Err(Error::UnknownAsset(asset)) => Err(Error::UnknownAsset(asset)),
            Err(e) => Err(Error::oracle_unavailable(format!("balance read of {} failed: {}", uri, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_skills_core::config::DEFAULT_BALANCE_URI_TEMPLATE;
    use agent_skills_core::mocks::MockResourceClient;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const T1_USDC: &str = "mcp://wallet_commerce/tenants/t1/agents/a1/balances/USDC";

    fn oracle(client: MockResourceClient) -> WalletBalanceOracle {
        WalletBalanceOracle::new(Arc::new(client), DEFAULT_BALANCE_URI_TEMPLATE).unwrap()
    }

    fn query() -> BalanceQuery {
        BalanceQuery::new("t1", "a1", "USDC").unwrap()
    }

    #[tokio::test]
    async fn test_reads_string_balance_exactly() {
        let oracle = oracle(MockResourceClient::new().with_resource(T1_USDC, json!({"balance": "100.00"})));
        let result = oracle.get_balance(&query()).await.unwrap();
        assert_eq!(result.current_balance.to_string(), "100.00");
    }

    #[tokio::test]
    async fn test_numeric_and_bare_balances() {
        let oracle = oracle(MockResourceClient::new().with_resource(T1_USDC, json!({"balance": 12.5})));
        assert_eq!(oracle.get_balance(&query()).await.unwrap().current_balance, dec!(12.5));

        let oracle = self::oracle(MockResourceClient::new().with_resource(T1_USDC, json!("7")));
        assert_eq!(oracle.get_balance(&query()).await.unwrap().current_balance, dec!(7));
    }

    #[tokio::test]
    async fn test_never_held_is_zero() {
        let missing_field = oracle(MockResourceClient::new().with_resource(T1_USDC, json!({})));
        assert!(missing_field.get_balance(&query()).await.unwrap().current_balance.is_zero());

        let no_record = oracle(MockResourceClient::new());
        assert!(no_record.get_balance(&query()).await.unwrap().current_balance.is_zero());
    }

    #[tokio::test]
    async fn test_unknown_asset_is_distinct() {
        let oracle = oracle(MockResourceClient::new().with_resource(T1_USDC, json!({"error": "unknown_asset"})));
        let err = oracle.get_balance(&query()).await.unwrap_err();
        assert!(matches!(err, Error::UnknownAsset(ref a) if a == "USDC"));
    }

    #[tokio::test]
    async fn test_failures_are_oracle_unavailable() {
        let down = oracle(MockResourceClient::new().with_failure(T1_USDC, "connection refused"));
        assert!(matches!(down.get_balance(&query()).await, Err(Error::OracleUnavailable(_))));

        for bad in [json!({"balance": "-3"}), json!({"balance": "lots"}), json!({"balance": [1]})] {
            let oracle = oracle(MockResourceClient::new().with_resource(T1_USDC, bad));
            assert!(matches!(oracle.get_balance(&query()).await, Err(Error::OracleUnavailable(_))));
        }
    }

    #[tokio::test]
    async fn test_balance_needing_rounding_is_unavailable() {
        for bad in [
            json!({"balance": "100.000000000000000000000000001"}),
            json!({"balance": "0.00000000000000000000000000001"}),
            json!({"balance": 1e-30}),
        ] {
            let oracle = oracle(MockResourceClient::new().with_resource(T1_USDC, bad.clone()));
            let err = oracle.get_balance(&query()).await.unwrap_err();
            assert!(matches!(err, Error::OracleUnavailable(_)), "{} gave {:?}", bad, err);
        }
    }

    #[tokio::test]
    async fn test_identifiers_are_percent_encoded() {
        let client = Arc::new(MockResourceClient::new());
        let oracle = WalletBalanceOracle::new(client.clone(), DEFAULT_BALANCE_URI_TEMPLATE).unwrap();

        let q = BalanceQuery::new("acme corp", "a/1", "USDC").unwrap();
        oracle.get_balance(&q).await.unwrap();

        assert_eq!(
            client.reads(),
            vec!["mcp://wallet_commerce/tenants/acme%20corp/agents/a%2F1/balances/USDC"]
        );
    }

    #[test]
    fn test_template_must_name_every_field() {
        let client = Arc::new(MockResourceClient::new());
        let err = WalletBalanceOracle::new(client, "mcp://wallet/{tenant_id}/{agent_id}").err().unwrap();
        assert!(err.to_string().contains("{currency_or_asset}"));
    }
}
