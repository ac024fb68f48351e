//! External resource traits.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{BalanceQuery, BalanceResult, ResourceUri};

/// Read-only access to URI-addressed resources on external servers.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Read a resource and return its content as JSON.
    async fn read_resource(&self, uri: &ResourceUri) -> Result<Value>;
}

/// The external system of record for current holdings.
///
/// Implementations must only read; no debit or reservation is ever issued
/// through this trait.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Look up the current balance. A never-held asset is a zero balance.
    async fn get_balance(&self, query: &BalanceQuery) -> Result<BalanceResult>;
}
