//! Query planning
//!
//! Turns a research topic into a batch of diversified SERP queries, seeded
//! with learnings gathered so far so deeper levels get sharper queries.

use super::types::{ClarifyingQuestions, SerpQuery};
use crate::prompts;
use crate::structured::StructuredCaller;
use crate::AgentResult;
use tracing::debug;

/// Maximum clarifying questions asked before a run
pub const MAX_CLARIFYING_QUESTIONS: usize = 5;

pub struct QueryPlanner {
    caller: StructuredCaller,
}

impl QueryPlanner {
    pub fn new(caller: StructuredCaller) -> Self {
        Self { caller }
    }

    /// Plan up to `num_queries` search queries for the topic
    ///
    /// The model may return more than asked for; the batch is truncated so the
    /// breadth budget holds regardless.
    pub async fn plan(
        &self,
        topic: &str,
        num_queries: usize,
        learnings: &[String],
    ) -> AgentResult<Vec<SerpQuery>> {
        let prompt = prompts::serp_queries_prompt(topic, num_queries, learnings);
        let mut queries: Vec<SerpQuery> = self
            .caller
            .call(&prompts::system_prompt(), &prompt, "generate SERP queries")
            .await?;

        queries.truncate(num_queries);
        debug!(topic = topic, planned = queries.len(), "Planned SERP queries");
        Ok(queries)
    }

    /// Ask clarifying questions about the topic before researching it
    pub async fn clarify(&self, topic: &str) -> AgentResult<Vec<String>> {
        let prompt = prompts::clarifying_questions_prompt(topic, MAX_CLARIFYING_QUESTIONS);
        let mut response: ClarifyingQuestions = self
            .caller
            .call(&prompts::system_prompt(), &prompt, "clarifying questions")
            .await?;

        response.questions.truncate(MAX_CLARIFYING_QUESTIONS);
        Ok(response.questions)
    }
}
