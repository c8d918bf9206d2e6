//! Deep research agent facade
//!
//! Wires the planner, engine and synthesizer together behind a single entry
//! point, and owns the wiring from configuration to concrete search and LLM
//! backends. Presentation layers (web, CLI) only ever talk to this type.

use crate::llm::SiumaiClient;
use crate::research::{
    OutputMode, ProgressSink, QueryPlanner, ResearchEngine, ResearchRequest, ResearchResult,
    Summarizer, Synthesizer,
};
use crate::structured::StructuredCaller;
use crate::AgentResult;
use delver_core::{CompletionPort, DelverConfig, SearchProvider};
use delver_search::create_search_provider;
use std::sync::Arc;
use tracing::{error, info};

pub struct DeepResearchAgent {
    engine: Arc<ResearchEngine>,
    planner: QueryPlanner,
    synthesizer: Synthesizer,
    config: DelverConfig,
}

impl DeepResearchAgent {
    /// Build an agent from configuration, creating the real LLM and search backends
    pub async fn from_config(config: DelverConfig) -> AgentResult<Self> {
        let llm: Arc<dyn CompletionPort> =
            Arc::new(SiumaiClient::new(config.llm.clone()).await?);
        let search = create_search_provider(&config.search)?;
        Ok(Self::new(llm, search, config))
    }

    /// Build an agent over explicit port implementations
    pub fn new(
        llm: Arc<dyn CompletionPort>,
        search: Arc<dyn SearchProvider>,
        config: DelverConfig,
    ) -> Self {
        let caller = StructuredCaller::new(llm, config.research.llm_timeout_ms);
        let engine = Arc::new(ResearchEngine::new(
            QueryPlanner::new(caller.clone()),
            Summarizer::new(caller.clone()),
            search,
            config.research.clone(),
        ));
        Self {
            engine,
            planner: QueryPlanner::new(caller.clone()),
            synthesizer: Synthesizer::new(caller),
            config,
        }
    }

    pub fn config(&self) -> &DelverConfig {
        &self.config
    }

    /// Ask clarifying questions for a topic before running research on it
    pub async fn clarify(&self, topic: &str) -> AgentResult<Vec<String>> {
        self.planner.clarify(topic).await
    }

    /// Execute a research run end to end
    ///
    /// When a sink is attached, the stream always terminates with either
    /// `Final` + `Done` or `Error` + `Done`, so consumers can read until the
    /// sentinel without watching for channel closure.
    pub async fn run(
        &self,
        request: ResearchRequest,
        sink: Option<ProgressSink>,
    ) -> AgentResult<String> {
        let tracker = crate::research::ProgressTracker::new(
            request.breadth,
            request.depth,
            sink.clone(),
        );

        match self.run_inner(&request, sink).await {
            Ok(output) => {
                tracker.finish(Ok(output.clone()));
                Ok(output)
            }
            Err(e) => {
                error!(error = %e, "Research run failed");
                tracker.finish(Err(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        request: &ResearchRequest,
        sink: Option<ProgressSink>,
    ) -> AgentResult<String> {
        let query = combined_query(&request.topic, &request.clarifications);
        info!(
            breadth = request.breadth,
            depth = request.depth,
            mode = ?request.mode,
            "Running deep research"
        );

        let result: ResearchResult = Arc::clone(&self.engine)
            .run(query.clone(), request.breadth, request.depth, sink)
            .await?;

        info!(
            learnings = result.learnings.len(),
            sources = result.visited_urls.len(),
            high_water = self.engine.gate().high_water_mark(),
            "Research expansion finished"
        );

        self.synthesizer
            .synthesize(&request.topic, &result, request.mode)
            .await
    }

    /// Convenience wrapper for a report-mode run without streaming
    pub async fn research_report(
        &self,
        topic: &str,
        breadth: usize,
        depth: usize,
    ) -> AgentResult<String> {
        self.run(
            ResearchRequest {
                topic: topic.to_string(),
                breadth,
                depth,
                mode: OutputMode::Report,
                clarifications: Vec::new(),
            },
            None,
        )
        .await
    }
}

/// Fold clarifying question/answer pairs into the effective research query
fn combined_query(topic: &str, clarifications: &[(String, String)]) -> String {
    if clarifications.is_empty() {
        return topic.to_string();
    }

    let qa_block = clarifications
        .iter()
        .map(|(q, a)| format!("Q: {}\nA: {}", q, a))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Initial Query: {}\nFollow-up Questions and Answers:\n{}",
        topic, qa_block
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_query_without_clarifications_is_the_topic() {
        assert_eq!(combined_query("quantum batteries", &[]), "quantum batteries");
    }

    #[test]
    fn combined_query_folds_in_answers() {
        let clarifications = vec![(
            "Which market?".to_string(),
            "The EU market.".to_string(),
        )];
        let query = combined_query("ev adoption", &clarifications);
        assert!(query.starts_with("Initial Query: ev adoption"));
        assert!(query.contains("Q: Which market?"));
        assert!(query.contains("A: The EU market."));
    }
}
