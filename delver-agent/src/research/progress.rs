//! Progress tracking and event streaming
//!
//! Each research run carries a tracker that holds a snapshot of where the run
//! stands. Updates happen under a mutex, and after every update a clone of
//! the snapshot is pushed to an optional event sink. Sending never blocks the
//! research itself; if the receiver is gone the event is simply dropped.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::trace;

/// Snapshot of a research run's position in the query tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchProgress {
    pub current_depth: usize,
    pub total_depth: usize,
    pub current_breadth: usize,
    pub total_breadth: usize,
    pub total_queries: usize,
    pub completed_queries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_query: Option<String>,
}

/// Events streamed to clients while a run executes
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    /// A progress snapshot after some unit of work
    Progress {
        #[serde(flatten)]
        snapshot: ResearchProgress,
    },
    /// The synthesized output, sent once at the end of a successful run
    Final { output: String },
    /// The run failed; the message is the terminal error
    Error { message: String },
    /// Always the last event of a stream, success or failure
    Done,
}

/// Channel end that receives research events
pub type ProgressSink = mpsc::UnboundedSender<ResearchEvent>;

/// Shared progress state with an optional streaming sink
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<Mutex<ResearchProgress>>,
    sink: Option<ProgressSink>,
}

impl ProgressTracker {
    pub fn new(total_breadth: usize, total_depth: usize, sink: Option<ProgressSink>) -> Self {
        let state = ResearchProgress {
            current_depth: total_depth,
            total_depth,
            current_breadth: total_breadth,
            total_breadth,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            sink,
        }
    }

    /// Apply a mutation to the snapshot and emit the updated state
    pub fn update<F: FnOnce(&mut ResearchProgress)>(&self, mutate: F) {
        let snapshot = {
            let mut state = match self.state.lock() {
                Ok(guard) => guard,
                // A poisoned lock only means a worker panicked mid-update;
                // progress reporting is best effort, so keep going
                Err(poisoned) => poisoned.into_inner(),
            };
            mutate(&mut state);
            state.clone()
        };

        trace!(
            completed = snapshot.completed_queries,
            total = snapshot.total_queries,
            "Research progress updated"
        );

        if let Some(sink) = &self.sink {
            let _ = sink.send(ResearchEvent::Progress { snapshot });
        }
    }

    /// Current snapshot, cloned out from under the lock
    pub fn snapshot(&self) -> ResearchProgress {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Emit a terminal event pair on the sink, if one is attached
    pub fn finish(&self, outcome: Result<String, String>) {
        if let Some(sink) = &self.sink {
            let event = match outcome {
                Ok(output) => ResearchEvent::Final { output },
                Err(message) => ResearchEvent::Error { message },
            };
            let _ = sink.send(event);
            let _ = sink.send(ResearchEvent::Done);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_emits_snapshot_to_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tracker = ProgressTracker::new(4, 2, Some(tx));

        tracker.update(|p| {
            p.total_queries = 4;
            p.current_query = Some("first".to_string());
        });

        match rx.try_recv().unwrap() {
            ResearchEvent::Progress { snapshot } => {
                assert_eq!(snapshot.total_queries, 4);
                assert_eq!(snapshot.current_query.as_deref(), Some("first"));
                assert_eq!(snapshot.total_depth, 2);
            }
            other => panic!("expected progress event, got {:?}", other),
        }
    }

    #[test]
    fn update_survives_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let tracker = ProgressTracker::new(2, 1, Some(tx));

        // Must not panic or error even though nobody is listening
        tracker.update(|p| p.completed_queries += 1);
        assert_eq!(tracker.snapshot().completed_queries, 1);
    }

    #[test]
    fn finish_sends_final_then_done() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tracker = ProgressTracker::new(1, 1, Some(tx));

        tracker.finish(Ok("report body".to_string()));

        assert!(matches!(
            rx.try_recv().unwrap(),
            ResearchEvent::Final { output } if output == "report body"
        ));
        assert!(matches!(rx.try_recv().unwrap(), ResearchEvent::Done));
    }

    #[test]
    fn finish_sends_error_then_done() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tracker = ProgressTracker::new(1, 1, Some(tx));

        tracker.finish(Err("boom".to_string()));

        assert!(matches!(
            rx.try_recv().unwrap(),
            ResearchEvent::Error { message } if message == "boom"
        ));
        assert!(matches!(rx.try_recv().unwrap(), ResearchEvent::Done));
    }

    #[test]
    fn event_serialization_uses_type_tag() {
        let event = ResearchEvent::Progress {
            snapshot: ResearchProgress {
                total_queries: 3,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["total_queries"], 3);

        let done = serde_json::to_value(ResearchEvent::Done).unwrap();
        assert_eq!(done["type"], "done");
    }
}
