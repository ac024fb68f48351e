//! Trend records from the news/trends MCP resource.

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use agent_skills_core::{
    config::TrendConfig,
    traits::{ResourceClient, TrendSource},
    types::{ResourceUri, TrendQuery, TrendRecord},
    Error, Result,
};

/// Trend source reading one MCP resource, filtered by query parameters.
pub struct McpTrendSource {
    resources: Arc<dyn ResourceClient>,
    uri: ResourceUri,
    timeout: Duration,
    max_records: Option<usize>,
}

impl McpTrendSource {
    pub fn new(resources: Arc<dyn ResourceClient>, uri: &str) -> Result<Self> {
        let defaults = TrendConfig::default();
        Ok(Self {
            resources,
            uri: ResourceUri::parse(uri)?,
            timeout: Duration::from_millis(defaults.timeout_ms),
            max_records: defaults.max_records,
        })
    }

    pub fn from_config(resources: Arc<dyn ResourceClient>, config: &TrendConfig) -> Result<Self> {
        Ok(Self::new(resources, &config.resource_uri)?
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_max_records(config.max_records))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap the number of records returned; `None` returns all.
    pub fn with_max_records(mut self, max_records: Option<usize>) -> Self {
        self.max_records = max_records;
        self
    }

    fn query_uri(&self, query: &TrendQuery) -> Result<ResourceUri> {
        let mut params = Vec::new();

        if let Some(tenant_id) = &query.tenant_id {
            if tenant_id.trim().is_empty() {
                return Err(Error::invalid_input("tenant_id must not be empty"));
            }
            params.push(("tenant_id", tenant_id.clone()));
        }

        if let Some(range) = &query.time_range {
            if range.from > range.to {
                return Err(Error::invalid_input("time range starts after it ends"));
            }
            params.push(("from", range.from.to_rfc3339_opts(SecondsFormat::Secs, true)));
            params.push(("to", range.to.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }

        Ok(self.uri.with_query(params))
    }
}

#[async_trait]
impl TrendSource for McpTrendSource {
    async fn fetch_trends(&self, query: &TrendQuery) -> Result<Vec<TrendRecord>> {
        let uri = self.query_uri(query)?;

        let content = tokio::time::timeout(self.timeout, self.resources.read_resource(&uri))
            .await
            .map_err(|_| {
                Error::resource_unavailable(format!("{} did not answer within {:?}", uri, self.timeout))
            })??;

        let items = match content {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("trends") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) => Vec::new(),
                _ => {
                    return Err(Error::malformed_resource(format!(
                        "{} holds an object without a 'trends' list",
                        uri
                    )))
                }
            },
            other => {
                return Err(Error::malformed_resource(format!(
                    "{} holds {} instead of a list of trends",
                    uri, other
                )))
            }
        };

        let mut records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(Error::malformed_resource(format!(
                    "trend #{} from {} is not an object: {}",
                    i, uri, other
                ))),
            })
            .collect::<Result<Vec<TrendRecord>>>()?;

        if let Some(max) = self.max_records {
            records.truncate(max);
        }

        tracing::debug!(uri = %uri, count = records.len(), "Fetched trends");
        Ok(records)
    }
}
