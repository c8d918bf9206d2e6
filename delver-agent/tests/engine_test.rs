//! Research engine integration tests over mock search and LLM ports

use delver_agent::research::{QueryPlanner, Summarizer};
use delver_agent::{ResearchEngine, StructuredCaller};
use delver_core::{
    async_trait, DelverError, DelverResult, ResearchSettings, SearchItem, SearchProvider,
    CompletionPort, RetryConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted LLM keyed on distinctive phrases in each pipeline prompt
struct MockLlm {
    /// Queries returned by the first planning call
    root_queries: Vec<&'static str>,
    /// Queries returned by every subsequent planning call
    child_queries: Vec<&'static str>,
    /// When the extraction prompt mentions this query, return garbage JSON
    malformed_extract_for: Option<&'static str>,
    plan_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    fn new(root_queries: Vec<&'static str>, child_queries: Vec<&'static str>) -> Self {
        Self {
            root_queries,
            child_queries,
            malformed_extract_for: None,
            plan_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn queries_json(queries: &[&str]) -> String {
        let entries: Vec<String> = queries
            .iter()
            .map(|q| format!("{{\"query\": \"{q}\", \"research_goal\": \"goal for {q}\"}}"))
            .collect();
        format!("[{}]", entries.join(","))
    }

    fn query_in(prompt: &str) -> &str {
        let start = prompt.find("<query>").map(|i| i + "<query>".len()).unwrap_or(0);
        let end = prompt.find("</query>").unwrap_or(prompt.len());
        &prompt[start..end]
    }
}

#[async_trait]
impl CompletionPort for MockLlm {
    async fn complete(&self, _system: &str, prompt: &str) -> DelverResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains("generate a list of SERP queries") {
            let call = self.plan_calls.fetch_add(1, Ordering::SeqCst);
            let queries = if call == 0 {
                &self.root_queries
            } else {
                &self.child_queries
            };
            return Ok(Self::queries_json(queries));
        }

        if prompt.contains("Refine and clean") {
            return Ok("cleaned content".to_string());
        }

        if prompt.contains("generate a list of learnings") {
            let query = Self::query_in(prompt);
            if self.malformed_extract_for == Some(query) {
                return Ok("sorry, I could not produce JSON here".to_string());
            }
            return Ok(format!(
                "{{\"learnings\": [\"learning about {query}\"], \"follow_up_questions\": [\"what next for {query}?\"]}}"
            ));
        }

        panic!("unexpected prompt: {}", &prompt[..prompt.len().min(80)]);
    }
}

/// Search stub returning one URL per query
struct MockSearch {
    /// Queries whose searches fail outright
    fail_for: Option<&'static str>,
    /// When set, every query returns this exact URL
    fixed_url: Option<&'static str>,
    current: AtomicUsize,
    max_seen: AtomicUsize,
}

impl MockSearch {
    fn new() -> Self {
        Self {
            fail_for: None,
            fixed_url: None,
            current: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, limit: usize) -> DelverResult<Vec<SearchItem>> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);

        if self.fail_for == Some(query) {
            return Err(DelverError::search(format!("backend refused '{query}'")));
        }

        let url = self
            .fixed_url
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://results.example/{}", query.replace(' ', "-")));

        Ok(vec![SearchItem {
            title: format!("Result for {query}"),
            description: format!("Raw page text about {query}"),
            url,
        }]
        .into_iter()
        .take(limit)
        .collect())
    }
}

fn build_engine(
    llm: Arc<MockLlm>,
    search: Arc<MockSearch>,
    settings: ResearchSettings,
) -> Arc<ResearchEngine> {
    let caller = StructuredCaller::new(llm, settings.llm_timeout_ms).with_retry(RetryConfig {
        max_attempts: 3,
        delay_ms: 1,
    });
    Arc::new(ResearchEngine::new(
        QueryPlanner::new(caller.clone()),
        Summarizer::new(caller),
        search,
        settings,
    ))
}

#[tokio::test(start_paused = true)]
async fn merges_learnings_and_urls_across_queries() {
    let llm = Arc::new(MockLlm::new(vec!["alpha", "beta"], vec![]));
    let search = Arc::new(MockSearch::new());
    let engine = build_engine(llm, search, ResearchSettings::default());

    let result = engine
        .run("test topic".to_string(), 2, 1, None)
        .await
        .unwrap();

    assert!(result.learnings.contains("learning about alpha"));
    assert!(result.learnings.contains("learning about beta"));
    assert_eq!(result.visited_urls.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn plans_once_per_level_and_stops_at_depth_one() {
    let llm = Arc::new(MockLlm::new(vec!["alpha", "beta"], vec!["gamma"]));
    let search = Arc::new(MockSearch::new());
    let engine = build_engine(Arc::clone(&llm), search, ResearchSettings::default());

    let result = engine
        .run("test topic".to_string(), 2, 2, None)
        .await
        .unwrap();

    // One plan at the root plus one per root branch; depth-1 children do not plan
    assert_eq!(llm.plan_calls.load(Ordering::SeqCst), 3);
    assert!(result.learnings.contains("learning about gamma"));
}

#[tokio::test(start_paused = true)]
async fn duplicate_urls_collapse_after_normalization() {
    let llm = Arc::new(MockLlm::new(vec!["alpha", "beta"], vec![]));
    let mut search = MockSearch::new();
    search.fixed_url = Some("https://results.example/shared/");
    let engine = build_engine(llm, Arc::new(search), ResearchSettings::default());

    let result = engine
        .run("test topic".to_string(), 2, 1, None)
        .await
        .unwrap();

    assert_eq!(result.visited_urls.len(), 1);
    // Trailing slash was stripped during dedup
    assert!(result
        .visited_urls
        .contains("https://results.example/shared"));
}

#[tokio::test(start_paused = true)]
async fn malformed_extraction_only_loses_its_own_branch() {
    let mut llm = MockLlm::new(vec!["alpha", "beta"], vec![]);
    llm.malformed_extract_for = Some("alpha");
    let search = Arc::new(MockSearch::new());
    let engine = build_engine(Arc::new(llm), search, ResearchSettings::default());

    let result = engine
        .run("test topic".to_string(), 2, 1, None)
        .await
        .unwrap();

    assert!(!result.learnings.contains("learning about alpha"));
    assert!(result.learnings.contains("learning about beta"));
}

#[tokio::test(start_paused = true)]
async fn failing_search_only_loses_its_own_branch() {
    let llm = Arc::new(MockLlm::new(vec!["alpha", "beta"], vec![]));
    let mut search = MockSearch::new();
    search.fail_for = Some("alpha");
    let engine = build_engine(llm, Arc::new(search), ResearchSettings::default());

    let result = engine
        .run("test topic".to_string(), 2, 1, None)
        .await
        .unwrap();

    assert!(!result.learnings.contains("learning about alpha"));
    assert!(result.learnings.contains("learning about beta"));
    assert_eq!(result.visited_urls.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn gate_bounds_concurrent_branches() {
    let llm = Arc::new(MockLlm::new(
        vec!["q1", "q2", "q3", "q4", "q5", "q6"],
        vec![],
    ));
    let search = Arc::new(MockSearch::new());
    let settings = ResearchSettings {
        concurrency_limit: 2,
        ..Default::default()
    };
    let engine = build_engine(llm, Arc::clone(&search), settings);

    Arc::clone(&engine)
        .run("test topic".to_string(), 6, 1, None)
        .await
        .unwrap();

    assert!(engine.gate().high_water_mark() <= 2);
    assert!(search.max_seen.load(Ordering::SeqCst) <= 2);
}

#[tokio::test(start_paused = true)]
async fn gate_bounds_branches_across_recursion() {
    let llm = Arc::new(MockLlm::new(
        vec!["q1", "q2", "q3", "q4"],
        vec!["child-a", "child-b"],
    ));
    let search = Arc::new(MockSearch::new());
    // Each branch holds its permit across the recursive descent, so the
    // limit must stay above the root fan-out or the tree deadlocks. With 4
    // roots each spawning 2 children, 8 permits keep everything schedulable
    // while still bounding the fan-out.
    let settings = ResearchSettings {
        concurrency_limit: 8,
        ..Default::default()
    };
    let engine = build_engine(Arc::clone(&llm), Arc::clone(&search), settings);

    let result = Arc::clone(&engine)
        .run("test topic".to_string(), 4, 2, None)
        .await
        .unwrap();

    // All 4 roots planned once each on top of the root plan
    assert_eq!(llm.plan_calls.load(Ordering::SeqCst), 5);
    assert!(result.learnings.contains("learning about child-a"));
    assert!(engine.gate().high_water_mark() <= 8);
    assert!(search.max_seen.load(Ordering::SeqCst) <= 8);
}

#[tokio::test(start_paused = true)]
async fn breadth_decays_on_recursion() {
    let llm = Arc::new(MockLlm::new(vec!["alpha"], vec!["beta"]));
    let search = Arc::new(MockSearch::new());
    let engine = build_engine(Arc::clone(&llm), search, ResearchSettings::default());

    engine.run("test topic".to_string(), 4, 2, None).await.unwrap();

    let prompts = llm.prompts.lock().unwrap();
    let plan_prompts: Vec<&String> = prompts
        .iter()
        .filter(|p| p.contains("generate a list of SERP queries"))
        .collect();
    assert_eq!(plan_prompts.len(), 2);
    assert!(plan_prompts[0].contains("maximum of 4 queries"));
    // (4 + 1) / 2 rounds up to 2
    assert!(plan_prompts[1].contains("maximum of 2 queries"));
    // The recursive topic carries the goal and follow-up directions forward
    assert!(plan_prompts[1].contains("Previous research goal: goal for alpha"));
    assert!(plan_prompts[1].contains("what next for alpha?"));
}

#[tokio::test(start_paused = true)]
async fn zero_depth_is_treated_as_one_level() {
    let llm = Arc::new(MockLlm::new(vec!["alpha"], vec![]));
    let search = Arc::new(MockSearch::new());
    let engine = build_engine(Arc::clone(&llm), search, ResearchSettings::default());

    let result = engine
        .run("test topic".to_string(), 1, 0, None)
        .await
        .unwrap();

    assert_eq!(llm.plan_calls.load(Ordering::SeqCst), 1);
    assert!(result.learnings.contains("learning about alpha"));
}

#[tokio::test(start_paused = true)]
async fn prior_learnings_seed_deeper_planning() {
    let llm = Arc::new(MockLlm::new(vec!["alpha"], vec![]));
    let search = Arc::new(MockSearch::new());
    let engine = build_engine(Arc::clone(&llm), search, ResearchSettings::default());

    engine.run("test topic".to_string(), 1, 2, None).await.unwrap();

    let prompts = llm.prompts.lock().unwrap();
    let deeper_plan = prompts
        .iter()
        .filter(|p| p.contains("generate a list of SERP queries"))
        .nth(1)
        .expect("recursion should plan a second time");
    assert!(deeper_plan.contains("learnings from previous research"));
    assert!(deeper_plan.contains("- learning about alpha"));
}
