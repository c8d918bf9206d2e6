//! Delver Core - Core data structures and trait definitions
//!
//! This module defines the shared abstractions for the Delver deep-research
//! system: error types, configuration, logging setup, async utilities, and the
//! narrow ports (search, LLM completion) the agent is built against.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod traits;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
