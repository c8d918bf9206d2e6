//! Recursive research engine
//!
//! One `expand` call handles one level of the query tree: plan queries, fan
//! them out as tasks, and for each query search, clean, extract, then either
//! recurse with a halved breadth budget or terminate. Every search request in
//! the whole process passes through a single concurrency gate, and each task
//! sleeps a short random jitter after acquiring its permit so bursts don't
//! land on the backend at once.
//!
//! A failing branch never takes down its siblings: its error is logged and it
//! contributes an empty result to the merge.

use super::planner::QueryPlanner;
use super::progress::{ProgressSink, ProgressTracker};
use super::summarizer::Summarizer;
use super::types::{normalize_url, ResearchResult, SerpQuery};
use crate::AgentResult;
use delver_core::{ConcurrencyGate, ResearchSettings, SearchProvider};
use futures::future::{join_all, BoxFuture};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Jitter floor before each search request, in milliseconds
const JITTER_BASE_MS: u64 = 500;
/// Jitter spread on top of the floor, in milliseconds
const JITTER_SPREAD_MS: u64 = 1000;

pub struct ResearchEngine {
    planner: QueryPlanner,
    summarizer: Summarizer,
    search: Arc<dyn SearchProvider>,
    gate: ConcurrencyGate,
    settings: ResearchSettings,
}

impl ResearchEngine {
    pub fn new(
        planner: QueryPlanner,
        summarizer: Summarizer,
        search: Arc<dyn SearchProvider>,
        settings: ResearchSettings,
    ) -> Self {
        let gate = ConcurrencyGate::new(settings.concurrency_limit);
        Self {
            planner,
            summarizer,
            search,
            gate,
            settings,
        }
    }

    /// The gate shared by every search request of this engine
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Run the full recursive expansion for a topic
    pub async fn run(
        self: Arc<Self>,
        topic: String,
        breadth: usize,
        depth: usize,
        sink: Option<ProgressSink>,
    ) -> AgentResult<ResearchResult> {
        let depth = depth.max(1);
        info!(topic = %topic, breadth, depth, "Starting research run");
        self.expand(topic, breadth, depth, Vec::new(), HashSet::new(), sink)
            .await
    }

    /// Expand one level of the query tree
    ///
    /// `learnings` carries everything gathered on the path from the root so
    /// the planner can sharpen deeper queries. Boxed because the recursion
    /// goes through spawned tasks.
    fn expand(
        self: Arc<Self>,
        topic: String,
        breadth: usize,
        depth: usize,
        learnings: Vec<String>,
        visited: HashSet<String>,
        sink: Option<ProgressSink>,
    ) -> BoxFuture<'static, AgentResult<ResearchResult>> {
        Box::pin(async move {
            let queries = self.planner.plan(&topic, breadth, &learnings).await?;

            let tracker = ProgressTracker::new(breadth, depth, sink.clone());
            tracker.update(|p| {
                p.total_queries = queries.len();
                p.current_query = queries.first().map(|q| q.query.clone());
            });

            let mut handles = Vec::with_capacity(queries.len());
            for query in queries {
                let engine = Arc::clone(&self);
                let learnings = learnings.clone();
                let visited = visited.clone();
                let tracker = tracker.clone();
                let sink = sink.clone();
                let branch_depth = depth;
                let branch_breadth = breadth;

                handles.push(tokio::spawn(async move {
                    let label = query.query.clone();
                    match engine
                        .run_branch(
                            query,
                            branch_breadth,
                            branch_depth,
                            learnings,
                            visited,
                            tracker,
                            sink,
                        )
                        .await
                    {
                        Ok(result) => result,
                        Err(e) => {
                            warn!(query = %label, error = %e, "Research branch failed, continuing without it");
                            ResearchResult::default()
                        }
                    }
                }));
            }

            let mut merged = ResearchResult::default();
            for outcome in join_all(handles).await {
                match outcome {
                    Ok(result) => merged.merge(result),
                    Err(e) => warn!(error = %e, "Research task aborted"),
                }
            }

            Ok(merged)
        })
    }

    /// Process a single planned query: search, clean, extract, maybe recurse
    #[allow(clippy::too_many_arguments)]
    async fn run_branch(
        self: Arc<Self>,
        query: SerpQuery,
        breadth: usize,
        depth: usize,
        learnings: Vec<String>,
        visited: HashSet<String>,
        tracker: ProgressTracker,
        sink: Option<ProgressSink>,
    ) -> AgentResult<ResearchResult> {
        let _permit = self.gate.acquire().await.map_err(crate::AgentError::Core)?;

        tracker.update(|p| {
            p.current_query = Some(query.query.clone());
        });

        let jitter = JITTER_BASE_MS + fastrand::u64(..JITTER_SPREAD_MS);
        tokio::time::sleep(Duration::from_millis(jitter)).await;

        let items = self
            .search
            .search(&query.query, self.settings.search_limit)
            .await?;
        debug!(query = %query.query, results = items.len(), "Search completed");

        let mut result = ResearchResult {
            learnings: learnings.iter().cloned().collect(),
            visited_urls: visited,
        };
        for item in &items {
            result.visited_urls.insert(normalize_url(&item.url));
        }

        let cleanups = items
            .iter()
            .filter(|item| !item.description.trim().is_empty())
            .map(|item| self.summarizer.clean_content(&item.description));
        let contents: Vec<String> = join_all(cleanups)
            .await
            .into_iter()
            .collect::<AgentResult<Vec<String>>>()?;

        let batch = self.summarizer.extract(&query.query, &contents).await?;
        result.learnings.extend(batch.learnings.iter().cloned());

        if depth > 1 {
            let next_breadth = breadth.div_ceil(2);
            let next_topic = format!(
                "Previous research goal: {}\nFollow-up research directions: {}",
                query.research_goal,
                batch.follow_up_questions.join("\n")
            );
            debug!(
                query = %query.query,
                next_breadth,
                next_depth = depth - 1,
                "Descending into follow-up research"
            );

            let all_learnings: Vec<String> = result.learnings.iter().cloned().collect();
            let deeper = Arc::clone(&self)
                .expand(
                    next_topic,
                    next_breadth,
                    depth - 1,
                    all_learnings,
                    result.visited_urls.clone(),
                    sink,
                )
                .await?;
            result.merge(deeper);
        } else {
            tracker.update(|p| {
                p.current_depth = 0;
                p.completed_queries += 1;
            });
        }

        Ok(result)
    }
}
