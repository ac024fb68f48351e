//! Core traits for the agent skills.
//!
//! Traits are organized by concern:
//! - `skills`: the three skill contracts plus the tool interface that exposes them
//! - `resources`: access to external, URI-addressed resources and the balance oracle

pub mod resources;
pub mod skills;

pub use resources::*;
pub use skills::*;
