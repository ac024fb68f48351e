#![deny(unused)]
//! Governance for the agent skills.
//!
//! This crate provides:
//! - Tracing setup (env filter, plain/JSON logs, optional OTLP export)
//! - Prometheus metrics helpers
//! - Audit logging with in-memory and JSON-lines stores
//! - An audited decorator for any budget gate

pub mod audit;
pub mod budget;
pub mod metrics;
pub mod tracing_layer;

pub use audit::{AuditEntry, AuditFilter, AuditOutcome, AuditStore, FileAuditStore, InMemoryAuditStore};
pub use budget::AuditedBudgetGate;
pub use metrics::{setup_metrics_recorder, track_budget_check, track_resource_read};
pub use tracing_layer::configure_tracing;
