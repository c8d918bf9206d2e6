//! Delver CLI - Command-line interface for deep research
//!
//! Runs a research request from the terminal, streaming progress lines while
//! the query tree executes and printing the final report or answer.

use anyhow::{Context, Result};
use clap::Parser;
use delver_agent::{DeepResearchAgent, OutputMode, ResearchEvent, ResearchRequest};
use delver_core::{init_logging, DelverConfig, LoggingConfig};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "delver")]
#[command(about = "Iterative deep research from the command line")]
#[command(version)]
struct Cli {
    /// Research topic or question
    topic: String,

    /// Number of parallel queries at the top level
    #[arg(short, long)]
    breadth: Option<usize>,

    /// Number of recursion levels
    #[arg(short, long)]
    depth: Option<usize>,

    /// Produce a short exact answer instead of a full report
    #[arg(long)]
    answer: bool,

    /// Ask clarifying questions interactively before researching
    #[arg(short, long)]
    interactive: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let logging = LoggingConfig {
        level: if cli.verbose { "debug" } else { "warn" }.to_string(),
        ..Default::default()
    };
    init_logging(&logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let mut config = match &cli.config {
        Some(path) => DelverConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DelverConfig::default(),
    };
    config.apply_env_overrides();

    let breadth = cli.breadth.unwrap_or(config.research.default_breadth);
    let depth = cli.depth.unwrap_or(config.research.default_depth);

    let agent = DeepResearchAgent::from_config(config)
        .await
        .context("Failed to initialize research agent")?;

    let clarifications = if cli.interactive {
        collect_clarifications(&agent, &cli.topic).await?
    } else {
        Vec::new()
    };

    let request = ResearchRequest {
        topic: cli.topic.clone(),
        breadth,
        depth,
        mode: if cli.answer {
            OutputMode::ExactAnswer
        } else {
            OutputMode::Report
        },
        clarifications,
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ResearchEvent::Progress { snapshot } => {
                    if let Some(query) = &snapshot.current_query {
                        eprintln!(
                            "[{}/{}] depth {} | {}",
                            snapshot.completed_queries,
                            snapshot.total_queries,
                            snapshot.current_depth,
                            query
                        );
                    }
                }
                ResearchEvent::Error { message } => {
                    eprintln!("Research failed: {}", message);
                }
                ResearchEvent::Final { .. } => {}
                ResearchEvent::Done => break,
            }
        }
    });

    eprintln!(
        "Researching \"{}\" (breadth {}, depth {})...",
        cli.topic, breadth, depth
    );

    let output = agent.run(request, Some(tx)).await?;
    debug!("Research run completed");

    if let Err(e) = printer.await {
        debug!("Progress printer task ended early: {}", e);
    }

    println!("{}", output);
    Ok(())
}

/// Ask the model's clarifying questions on stdin and collect the answers
async fn collect_clarifications(
    agent: &DeepResearchAgent,
    topic: &str,
) -> Result<Vec<(String, String)>> {
    let questions = agent
        .clarify(topic)
        .await
        .context("Failed to generate clarifying questions")?;

    if questions.is_empty() {
        return Ok(Vec::new());
    }

    eprintln!("A few questions to sharpen the research direction:");

    let stdin = std::io::stdin();
    let mut pairs = Vec::with_capacity(questions.len());
    for question in questions {
        eprint!("{}\n> ", question);
        std::io::stderr().flush().ok();

        let mut answer = String::new();
        stdin
            .lock()
            .read_line(&mut answer)
            .context("Failed to read answer from stdin")?;
        let answer = answer.trim().to_string();
        if !answer.is_empty() {
            pairs.push((question, answer));
        }
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parsing() {
        let cli = Cli::parse_from(["delver", "quantum batteries"]);
        assert_eq!(cli.topic, "quantum batteries");
        assert!(cli.breadth.is_none());
        assert!(!cli.answer);

        let cli = Cli::parse_from([
            "delver",
            "ev adoption",
            "--breadth",
            "6",
            "--depth",
            "3",
            "--answer",
        ]);
        assert_eq!(cli.breadth, Some(6));
        assert_eq!(cli.depth, Some(3));
        assert!(cli.answer);
    }
}
