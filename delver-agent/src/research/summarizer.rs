//! Content cleaning and learning extraction

use super::types::LearningBatch;
use crate::prompts;
use crate::structured::StructuredCaller;
use crate::AgentResult;
use tracing::debug;

/// Cap on learnings extracted per query
pub const MAX_LEARNINGS_PER_QUERY: usize = 3;
/// Cap on follow-up questions extracted per query
pub const MAX_FOLLOW_UPS_PER_QUERY: usize = 3;

pub struct Summarizer {
    caller: StructuredCaller,
}

impl Summarizer {
    pub fn new(caller: StructuredCaller) -> Self {
        Self { caller }
    }

    /// Clean one page's raw content into a dense plain-text summary
    pub async fn clean_content(&self, content: &str) -> AgentResult<String> {
        let prompt = prompts::content_cleaning_prompt(content);
        self.caller
            .call_text(&prompts::system_prompt(), &prompt, "clean search content")
            .await
    }

    /// Extract learnings and follow-up questions from cleaned contents
    pub async fn extract(&self, query: &str, contents: &[String]) -> AgentResult<LearningBatch> {
        let prompt = prompts::serp_analysis_prompt(
            query,
            contents,
            MAX_LEARNINGS_PER_QUERY,
            MAX_FOLLOW_UPS_PER_QUERY,
        );
        let mut batch: LearningBatch = self
            .caller
            .call(&prompts::system_prompt(), &prompt, "generate a list of learnings")
            .await?;

        batch.learnings.truncate(MAX_LEARNINGS_PER_QUERY);
        batch.follow_up_questions.truncate(MAX_FOLLOW_UPS_PER_QUERY);

        debug!(
            query = query,
            learnings = batch.learnings.len(),
            follow_ups = batch.follow_up_questions.len(),
            "Extracted learnings"
        );
        Ok(batch)
    }
}
