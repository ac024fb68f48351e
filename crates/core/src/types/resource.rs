use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

// =============================================================================
// Resource URIs
// =============================================================================

/// An external resource identifier such as `mcp://news/trends`.
///
/// The authority names the server that owns the resource; everything after it
/// is opaque to this crate and only interpreted by that server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUri {
    url: Url,
    server: String,
}

impl ResourceUri {
    /// Parse and validate a resource URI.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| Error::invalid_input(format!("invalid resource URI '{}': {}", raw, e)))?;

        let server = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                Error::invalid_input(format!("resource URI '{}' has no server name", raw))
            })?
            .to_string();

        Ok(Self { url, server })
    }

    /// Name of the server owning this resource (the URI authority).
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Return a copy with the given query parameters appended.
    pub fn with_query<'a>(&self, params: impl IntoIterator<Item = (&'a str, String)>) -> Self {
        let mut url = self.url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, &value);
            }
        }
        // An empty serializer leaves a dangling '?'.
        if url.query() == Some("") {
            url.set_query(None);
        }
        Self {
            url,
            server: self.server.clone(),
        }
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ResourceUri {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceUri {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Task Context
// =============================================================================

/// What the resolver knows about the task asking for resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskContext {
    /// Task type, e.g. `trend_analysis`.
    #[serde(default)]
    pub task_type: Option<String>,

    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Resources the task declared explicitly.
    #[serde(default)]
    pub required_resources: Vec<String>,
}

impl TaskContext {
    pub fn for_task_type(task_type: impl Into<String>) -> Self {
        Self {
            task_type: Some(task_type.into()),
            ..Default::default()
        }
    }

    pub fn with_required_resources(mut self, uris: Vec<&str>) -> Self {
        self.required_resources = uris.into_iter().map(|s| s.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_names() {
        let uri = ResourceUri::parse("mcp://news/trends").unwrap();
        assert_eq!(uri.server(), "news");
        assert_eq!(uri.scheme(), "mcp");

        let uri = ResourceUri::parse("service://wallet-commerce/balances/t1").unwrap();
        assert_eq!(uri.server(), "wallet-commerce");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "not a uri", "mcp:trends", "/relative/path"] {
            assert!(ResourceUri::parse(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_with_query() {
        let uri = ResourceUri::parse("mcp://news/trends").unwrap();
        let q = uri.with_query([("tenant_id", "t 1".to_string())]);
        assert_eq!(q.as_str(), "mcp://news/trends?tenant_id=t+1");
        assert_eq!(q.server(), "news");

        let unchanged = uri.with_query(Vec::new());
        assert_eq!(unchanged.as_str(), "mcp://news/trends");
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let uri: ResourceUri = serde_json::from_str("\"mcp://news/trends\"").unwrap();
        assert_eq!(uri.as_str(), "mcp://news/trends");
        assert!(serde_json::from_str::<ResourceUri>("\"nope\"").is_err());
    }
}
