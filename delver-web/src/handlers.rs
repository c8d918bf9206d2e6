//! Request handlers for the research API

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{sse::Event, Json, Sse},
};
use delver_agent::{OutputMode, ResearchEvent, ResearchRequest};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use utoipa::ToSchema;

/// Research run request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResearchApiRequest {
    /// Topic or question to research
    pub query: String,
    /// Queries fanned out at the top level (server default when omitted)
    pub breadth: Option<usize>,
    /// Recursion levels (server default when omitted)
    pub depth: Option<usize>,
    /// Produce a detailed report (true, default) or a short exact answer (false)
    pub is_report: Option<bool>,
    /// Clarifying question/answer pairs from a prior clarify call
    #[serde(default)]
    #[schema(value_type = Vec<Vec<String>>)]
    pub clarifications: Vec<(String, String)>,
}

/// Research run response for the non-streaming endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ResearchApiResponse {
    /// Final report markdown or exact answer text
    pub output: String,
}

/// Clarifying questions request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClarifyRequest {
    pub query: String,
}

/// Clarifying questions response
#[derive(Debug, Serialize, ToSchema)]
pub struct ClarifyResponse {
    pub questions: Vec<String>,
}

impl ResearchApiRequest {
    fn into_research_request(self, state: &AppState) -> ResearchRequest {
        ResearchRequest {
            topic: self.query,
            breadth: self.breadth.unwrap_or(state.research_defaults.default_breadth),
            depth: self.depth.unwrap_or(state.research_defaults.default_depth),
            mode: if self.is_report.unwrap_or(true) {
                OutputMode::Report
            } else {
                OutputMode::ExactAnswer
            },
            clarifications: self.clarifications,
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Research",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "delver-web",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ask clarifying questions for a topic
#[utoipa::path(
    post,
    path = "/api/research/clarify",
    tag = "Research",
    summary = "Get clarifying questions for a research topic",
    request_body = ClarifyRequest,
    responses(
        (status = 200, description = "Clarifying questions", body = ClarifyResponse),
        (status = 500, description = "Failed to generate questions")
    )
)]
pub async fn clarify_topic(
    State(state): State<AppState>,
    Json(request): Json<ClarifyRequest>,
) -> Result<Json<ClarifyResponse>, StatusCode> {
    match state.agent.clarify(&request.query).await {
        Ok(questions) => Ok(Json(ClarifyResponse { questions })),
        Err(e) => {
            error!("Failed to generate clarifying questions: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Run research to completion and return the final output
#[utoipa::path(
    post,
    path = "/api/research",
    tag = "Research",
    summary = "Run a research request to completion",
    request_body = ResearchApiRequest,
    responses(
        (status = 200, description = "Research completed", body = ResearchApiResponse),
        (status = 500, description = "Research run failed")
    )
)]
pub async fn run_research(
    State(state): State<AppState>,
    Json(request): Json<ResearchApiRequest>,
) -> Result<Json<ResearchApiResponse>, StatusCode> {
    let research_request = request.into_research_request(&state);
    info!(
        breadth = research_request.breadth,
        depth = research_request.depth,
        "Running research request"
    );

    match state.agent.run(research_request, None).await {
        Ok(output) => Ok(Json(ResearchApiResponse { output })),
        Err(e) => {
            error!("Research run failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Run research with streaming progress updates
///
/// Events are serialized as JSON SSE data frames. The stream always ends
/// with a `done` event after either the `final` output or an `error`.
#[utoipa::path(
    post,
    path = "/api/research/stream",
    tag = "Research",
    summary = "Run research with streaming progress updates",
    request_body = ResearchApiRequest,
    responses(
        (status = 200, description = "Streaming research events", content_type = "text/event-stream")
    )
)]
pub async fn run_research_stream(
    State(state): State<AppState>,
    Json(request): Json<ResearchApiRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let research_request = request.into_research_request(&state);
    info!(
        breadth = research_request.breadth,
        depth = research_request.depth,
        "Starting streaming research request"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let agent = state.agent.clone();
    tokio::spawn(async move {
        // Terminal events reach the stream via the sink, nothing to do here
        let _ = agent.run(research_request, Some(tx)).await;
    });

    let stream = event_stream(rx);
    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Drain the event channel into SSE frames, stopping after the sentinel
fn event_stream(
    rx: mpsc::UnboundedReceiver<ResearchEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((rx, false), |(mut rx, finished)| async move {
        if finished {
            return None;
        }
        let event = rx.recv().await?;
        let is_done = matches!(event, ResearchEvent::Done);
        let frame = match Event::default().json_data(&event) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize research event: {}", e);
                Event::default().data("{\"type\":\"error\",\"message\":\"serialization failure\"}")
            }
        };
        Some((Ok(frame), (rx, is_done)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn stream_ends_after_done_sentinel() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ResearchEvent::Final {
            output: "report".to_string(),
        })
        .unwrap();
        tx.send(ResearchEvent::Done).unwrap();
        // Anything after the sentinel must not be emitted
        tx.send(ResearchEvent::Error {
            message: "late".to_string(),
        })
        .unwrap();

        let frames: Vec<_> = event_stream(rx).collect().await;
        assert_eq!(frames.len(), 2);
    }

    #[tokio::test]
    async fn stream_closes_when_sender_drops() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ResearchEvent::Done).unwrap();
        drop(tx);

        let frames: Vec<_> = event_stream(rx).collect().await;
        assert_eq!(frames.len(), 1);
    }
}
