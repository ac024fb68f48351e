//! Audit logging of budget decisions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

use agent_skills_core::{Error, Result};

/// Outcome of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Allowed,
    Denied,
    /// The action failed; carries the error code.
    Error(String),
}

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry ID.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub tenant_id: String,
    pub agent_id: String,
    /// Action performed (e.g. "budget_check").
    pub action: String,
    /// Currency or asset the action concerned.
    pub resource: String,
    pub outcome: AuditOutcome,
    /// Optional metadata (JSON).
    pub metadata: Option<serde_json::Value>,
}

/// Filter for querying audit logs.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub tenant_id: Option<String>,
    pub agent_id: Option<String>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    fn matches(&self, e: &AuditEntry) -> bool {
        self.tenant_id.as_ref().map_or(true, |t| &e.tenant_id == t)
            && self.agent_id.as_ref().map_or(true, |a| &e.agent_id == a)
            && self.action.as_ref().map_or(true, |a| &e.action == a)
            && self.from.map_or(true, |from| e.timestamp >= from)
            && self.to.map_or(true, |to| e.timestamp <= to)
    }

    fn apply<'a>(&self, entries: impl Iterator<Item = &'a AuditEntry>) -> Vec<AuditEntry> {
        let matched = entries.filter(|e| self.matches(e)).cloned();
        match self.limit {
            Some(limit) => matched.take(limit).collect(),
            None => matched.collect(),
        }
    }
}

/// Trait for audit log persistence.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Log an audit entry.
    async fn log(&self, entry: AuditEntry) -> Result<()>;

    /// Query audit logs with optional filters, oldest first.
    async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEntry>>;
}

/// In-memory audit store.
#[derive(Default)]
pub struct InMemoryAuditStore {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn log(&self, entry: AuditEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| Error::internal("audit store lock poisoned"))?
            .push(entry);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::internal("audit store lock poisoned"))?;
        Ok(filter.apply(entries.iter()))
    }
}

/// Append-only audit store writing one JSON object per line.
pub struct FileAuditStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileAuditStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditStore for FileAuditStore {
    async fn log(&self, entry: AuditEntry) -> Result<()> {
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::internal(format!("cannot open audit log {}: {}", self.path.display(), e)))?;
        file.write_all(&line)
            .await
            .map_err(|e| Error::internal(format!("cannot append to audit log: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| Error::internal(format!("cannot flush audit log: {}", e)))?;
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEntry>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::internal(format!(
                    "cannot read audit log {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let entries = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<AuditEntry>)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(filter.apply(entries.iter()))
    }
}
