//! Delver Agent - Iterative deep-research engine
//!
//! This crate implements the research agent on top of the narrow ports defined
//! in delver-core. Given a topic, it:
//!
//! - plans a diversified set of search queries,
//! - fans them out concurrently under a process-wide gate,
//! - extracts atomic learnings and follow-up questions per query,
//! - recurses into narrower research with a decayed breadth budget,
//! - merges everything by set union and synthesizes a report or short answer.
//!
//! ## Architecture
//!
//! The layering follows a clear separation between:
//! - **Ports** (delver-core): search and LLM completion interfaces
//! - **Agent** (this crate): planning, expansion, synthesis
//! - **Presentation** (delver-web/cli): user interfaces

pub mod agent;
pub mod llm;
pub mod prompts;
pub mod research;
pub mod structured;

pub use agent::DeepResearchAgent;
pub use llm::SiumaiClient;
pub use research::{
    OutputMode, ProgressSink, ResearchEngine, ResearchEvent, ResearchProgress, ResearchRequest,
    ResearchResult, SerpQuery,
};
pub use structured::StructuredCaller;

use delver_core::DelverError;

/// Agent-level error type
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Core error: {0}")]
    Core(#[from] DelverError),

    #[error("Planning error: {message}")]
    Planning { message: String },

    #[error("Research error: {message}")]
    Research { message: String },

    #[error("Synthesis error: {message}")]
    Synthesis { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    /// Create a planning error
    pub fn planning<S: Into<String>>(message: S) -> Self {
        Self::Planning {
            message: message.into(),
        }
    }

    /// Create a research error
    pub fn research<S: Into<String>>(message: S) -> Self {
        Self::Research {
            message: message.into(),
        }
    }

    /// Create a synthesis error
    pub fn synthesis<S: Into<String>>(message: S) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }
}
