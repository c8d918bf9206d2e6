//! Final output synthesis
//!
//! Takes the merged learnings of a run and produces either a long markdown
//! report with a sources section appended, or a bare exact answer.

use super::types::{ExactAnswer, FinalReport, OutputMode, ResearchResult};
use crate::prompts;
use crate::structured::StructuredCaller;
use crate::AgentResult;
use tracing::info;

pub struct Synthesizer {
    caller: StructuredCaller,
}

impl Synthesizer {
    pub fn new(caller: StructuredCaller) -> Self {
        Self { caller }
    }

    /// Produce the final output for the requested mode
    pub async fn synthesize(
        &self,
        topic: &str,
        result: &ResearchResult,
        mode: OutputMode,
    ) -> AgentResult<String> {
        let learnings_block = bullet_block(&result.learnings);
        info!(
            learnings = result.learnings.len(),
            sources = result.visited_urls.len(),
            ?mode,
            "Synthesizing final output"
        );

        match mode {
            OutputMode::Report => {
                let prompt = prompts::final_report_prompt(topic, &learnings_block);
                let report: FinalReport = self
                    .caller
                    .call(&prompts::system_prompt(), &prompt, "write final report")
                    .await?;
                Ok(append_sources(report.report_markdown, result))
            }
            OutputMode::ExactAnswer => {
                let prompt = prompts::final_answer_prompt(topic, &learnings_block);
                let answer: ExactAnswer = self
                    .caller
                    .call(&prompts::system_prompt(), &prompt, "write exact answer")
                    .await?;
                Ok(answer.exact_answer)
            }
        }
    }
}

fn bullet_block(learnings: &std::collections::HashSet<String>) -> String {
    let mut sorted: Vec<&String> = learnings.iter().collect();
    sorted.sort();
    sorted
        .iter()
        .map(|l| format!("- {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

fn append_sources(mut report: String, result: &ResearchResult) -> String {
    let mut urls: Vec<&String> = result.visited_urls.iter().collect();
    urls.sort();
    if !urls.is_empty() {
        report.push_str("\n\n## Sources\n\n");
        for url in urls {
            report.push_str(&format!("- {}\n", url));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sources_section_lists_urls_sorted() {
        let mut result = ResearchResult::default();
        result.visited_urls.insert("https://b.example/x".to_string());
        result.visited_urls.insert("https://a.example/y".to_string());

        let report = append_sources("Body".to_string(), &result);
        let a_pos = report.find("https://a.example/y").unwrap();
        let b_pos = report.find("https://b.example/x").unwrap();
        assert!(report.contains("## Sources"));
        assert!(a_pos < b_pos);
    }

    #[test]
    fn no_sources_section_without_urls() {
        let result = ResearchResult {
            learnings: HashSet::new(),
            visited_urls: HashSet::new(),
        };
        let report = append_sources("Body".to_string(), &result);
        assert_eq!(report, "Body");
    }
}
