//! Core type definitions for the agent skills.
//!
//! Broken down into submodules by skill.

pub mod budget;
pub mod resource;
pub mod tool;
pub mod trend;

pub use budget::*;
pub use resource::*;
pub use tool::*;
pub use trend::*;
