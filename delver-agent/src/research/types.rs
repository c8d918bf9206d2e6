//! Data types flowing through the research pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single planned search query with its research goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpQuery {
    /// The query string to hand to the search backend
    pub query: String,
    /// What this query is meant to establish, and where to go next with it
    pub research_goal: String,
}

/// Learnings and follow-up questions extracted from one query's results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningBatch {
    #[serde(default)]
    pub learnings: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

/// Long-form synthesis output
#[derive(Debug, Clone, Deserialize)]
pub struct FinalReport {
    pub report_markdown: String,
}

/// Short-form synthesis output
#[derive(Debug, Clone, Deserialize)]
pub struct ExactAnswer {
    pub exact_answer: String,
}

/// Questions asked before a run to sharpen the research direction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClarifyingQuestions {
    #[serde(default)]
    pub questions: Vec<String>,
}

/// What kind of final output the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Detailed multi-page markdown report
    Report,
    /// Concise answer, a sentence at most
    ExactAnswer,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::Report
    }
}

/// A full research run request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// The topic or question to research
    pub topic: String,
    /// How many queries to fan out at the root (halved per level below)
    pub breadth: usize,
    /// How many recursion levels to descend
    pub depth: usize,
    /// Report or exact answer
    #[serde(default)]
    pub mode: OutputMode,
    /// Clarifying question/answer pairs folded into the effective query
    #[serde(default)]
    pub clarifications: Vec<(String, String)>,
}

/// Accumulated findings of a research run (or a branch of one)
#[derive(Debug, Clone, Default)]
pub struct ResearchResult {
    pub learnings: HashSet<String>,
    pub visited_urls: HashSet<String>,
}

impl ResearchResult {
    /// Fold another result into this one; duplicates collapse by set union
    pub fn merge(&mut self, other: ResearchResult) {
        self.learnings.extend(other.learnings);
        self.visited_urls.extend(other.visited_urls);
    }
}

/// Canonicalize a URL for dedup purposes
///
/// Trims whitespace and drops a single trailing slash on non-root paths, so
/// `https://a.example/page` and `https://a.example/page/` count once. URLs
/// that do not parse are kept verbatim rather than dropped.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(parsed) => {
            let mut text = parsed.to_string();
            if parsed.path() != "/" && text.ends_with('/') {
                text.pop();
            }
            text
        }
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_learnings_and_urls() {
        let mut a = ResearchResult::default();
        a.learnings.insert("fact one".to_string());
        a.visited_urls.insert("https://a.example".to_string());

        let mut b = ResearchResult::default();
        b.learnings.insert("fact one".to_string());
        b.learnings.insert("fact two".to_string());
        b.visited_urls.insert("https://b.example".to_string());

        a.merge(b);
        assert_eq!(a.learnings.len(), 2);
        assert_eq!(a.visited_urls.len(), 2);
    }

    #[test]
    fn normalize_url_drops_trailing_slash_on_paths() {
        assert_eq!(
            normalize_url("https://a.example/page/"),
            normalize_url("https://a.example/page")
        );
    }

    #[test]
    fn normalize_url_keeps_root_slash() {
        assert_eq!(normalize_url("https://a.example/"), "https://a.example/");
    }

    #[test]
    fn normalize_url_keeps_unparseable_input() {
        assert_eq!(normalize_url("  not a url  "), "not a url");
    }

    #[test]
    fn learning_batch_tolerates_missing_fields() {
        let batch: LearningBatch = serde_json::from_str("{\"learnings\": [\"x\"]}").unwrap();
        assert_eq!(batch.learnings.len(), 1);
        assert!(batch.follow_up_questions.is_empty());
    }
}
