#![deny(unused)]
//! Core types, traits, and error definitions for the agent skills.
//!
//! This crate provides the building blocks shared by the skills and
//! governance crates: the budget value types, the resource and trend
//! contracts, configuration, and test mocks.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
