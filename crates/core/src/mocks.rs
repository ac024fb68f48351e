//! Mock implementations of core traits for testing.
//!
//! These are shared by the unit and integration tests of every crate in the
//! workspace.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    traits::{BalanceOracle, ResourceClient},
    types::{BalanceQuery, BalanceResult, ResourceUri},
    Error, Result,
};

// =============================================================================
// Mock Balance Oracle
// =============================================================================

#[derive(Debug, Clone)]
enum OracleBehavior {
    Balance(Decimal),
    Unavailable,
    UnknownAsset,
}

/// Scripted balance oracle that records every query it receives.
pub struct MockBalanceOracle {
    behavior: OracleBehavior,
    per_asset: HashMap<String, Decimal>,
    delay: Option<Duration>,
    queries: Mutex<Vec<BalanceQuery>>,
}

impl MockBalanceOracle {
    /// An oracle reporting the same balance for every query.
    pub fn with_balance(balance: Decimal) -> Self {
        Self::new(OracleBehavior::Balance(balance))
    }

    /// An oracle that cannot be reached.
    pub fn unavailable() -> Self {
        Self::new(OracleBehavior::Unavailable)
    }

    /// An oracle that rejects every asset as unrecognized.
    pub fn unknown_asset() -> Self {
        Self::new(OracleBehavior::UnknownAsset)
    }

    fn new(behavior: OracleBehavior) -> Self {
        Self {
            behavior,
            per_asset: HashMap::new(),
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Override the balance for one asset.
    pub fn with_asset_balance(mut self, asset: &str, balance: Decimal) -> Self {
        self.per_asset.insert(asset.to_string(), balance);
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of balance reads performed.
    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<BalanceQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl BalanceOracle for MockBalanceOracle {
    async fn get_balance(&self, query: &BalanceQuery) -> Result<BalanceResult> {
        self.queries.lock().unwrap().push(query.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(balance) = self.per_asset.get(&query.currency_or_asset) {
            return Ok(BalanceResult::new(*balance));
        }

        match &self.behavior {
            OracleBehavior::Balance(balance) => Ok(BalanceResult::new(*balance)),
            OracleBehavior::Unavailable => Err(Error::oracle_unavailable("mock oracle is down")),
            OracleBehavior::UnknownAsset => Err(Error::unknown_asset(query.currency_or_asset.clone())),
        }
    }
}

// =============================================================================
// Mock Resource Client
// =============================================================================

/// In-memory resource client keyed by full URI string.
#[derive(Default)]
pub struct MockResourceClient {
    resources: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashMap<String, String>>,
    reads: Mutex<Vec<String>>,
}

impl MockResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `uri`.
    pub fn with_resource(self, uri: &str, content: Value) -> Self {
        self.resources.lock().unwrap().insert(uri.to_string(), content);
        self
    }

    /// Fail reads of `uri` as unavailable.
    pub fn with_failure(self, uri: &str, message: &str) -> Self {
        self.failing
            .lock()
            .unwrap()
            .insert(uri.to_string(), message.to_string());
        self
    }

    /// URIs read so far, in order.
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    async fn read_resource(&self, uri: &ResourceUri) -> Result<Value> {
        let key = uri.as_str().to_string();
        self.reads.lock().unwrap().push(key.clone());

        if let Some(message) = self.failing.lock().unwrap().get(&key) {
            return Err(Error::resource_unavailable(message.clone()));
        }

        self.resources
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::resource_not_found(key))
    }
}
