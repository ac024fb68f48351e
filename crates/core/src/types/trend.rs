use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One trend record: string keys mapped to JSON-compatible values.
///
/// No particular keys are required; sources commonly provide `id`, `label`,
/// `score` and `source_uri`.
pub type TrendRecord = serde_json::Map<String, serde_json::Value>;

/// Inclusive time window for trend retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from > to {
            return Err(Error::invalid_input(format!(
                "time range starts after it ends: {} > {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        Ok(Self { from, to })
    }
}

/// Optional filters for a trend fetch. The default fetches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendQuery {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

impl TrendQuery {
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            time_range: None,
        }
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }
}
