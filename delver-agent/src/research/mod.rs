//! Recursive research pipeline
//!
//! The pipeline is split along its natural seams: the planner turns topics
//! into search queries, the summarizer turns page contents into learnings,
//! the engine drives the recursive fan-out under a concurrency gate, and the
//! synthesizer writes the final report or answer from the accumulated
//! learnings.

pub mod engine;
pub mod planner;
pub mod progress;
pub mod summarizer;
pub mod synthesizer;
pub mod types;

pub use engine::ResearchEngine;
pub use planner::QueryPlanner;
pub use progress::{ProgressSink, ProgressTracker, ResearchEvent, ResearchProgress};
pub use summarizer::Summarizer;
pub use synthesizer::Synthesizer;
pub use types::{
    normalize_url, ClarifyingQuestions, ExactAnswer, FinalReport, LearningBatch, OutputMode,
    ResearchRequest, ResearchResult, SerpQuery,
};
