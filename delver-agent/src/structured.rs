//! Structured-output calls against a completion port
//!
//! Models are asked for strict JSON, but real responses often arrive wrapped
//! in code fences, prefixed with prose, or carrying trailing commas. The
//! caller here scrubs that noise before handing the payload to serde, and
//! retries transient failures with a fixed delay. A response that parses into
//! valid text but not into the declared shape is a model error, not a
//! transport error, and is surfaced immediately instead of retried.

use crate::{AgentError, AgentResult};
use delver_core::{retry_async, with_timeout, CompletionPort, DelverError, RetryConfig};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// JSON-typed wrapper around a [`CompletionPort`]
#[derive(Clone)]
pub struct StructuredCaller {
    llm: Arc<dyn CompletionPort>,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl StructuredCaller {
    pub fn new(llm: Arc<dyn CompletionPort>, timeout_ms: u64) -> Self {
        Self {
            llm,
            retry: RetryConfig::default(),
            timeout_ms,
        }
    }

    /// Override the retry policy, mainly for tests
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run a completion and deserialize the response into `T`
    pub async fn call<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: &str,
        operation_name: &str,
    ) -> AgentResult<T> {
        let raw = self.call_text(system, prompt, operation_name).await?;
        let cleaned = clean_model_json(&raw);

        let value: T = serde_json::from_str(&cleaned).map_err(|e| {
            warn!(
                operation = operation_name,
                error = %e,
                "Model response did not match the expected schema"
            );
            AgentError::Core(DelverError::invalid_response(format!(
                "{} returned malformed JSON: {}",
                operation_name, e
            )))
        })?;

        debug!(operation = operation_name, "Structured call succeeded");
        Ok(value)
    }

    /// Run a completion and return the raw text, with retry and timeout applied
    pub async fn call_text(
        &self,
        system: &str,
        prompt: &str,
        operation_name: &str,
    ) -> AgentResult<String> {
        let llm = Arc::clone(&self.llm);
        let system = system.to_string();
        let prompt = prompt.to_string();
        let timeout_ms = self.timeout_ms;
        let op = operation_name.to_string();

        let text = retry_async(
            move || {
                let llm = Arc::clone(&llm);
                let system = system.clone();
                let prompt = prompt.clone();
                let op = op.clone();
                Box::pin(async move {
                    with_timeout(llm.complete(&system, &prompt), timeout_ms, &op).await
                })
            },
            self.retry.clone(),
            operation_name,
        )
        .await?;

        Ok(text)
    }
}

/// Strip fences and noise around a JSON payload so serde can parse it
///
/// Handles three common failure shapes: markdown code fences around the body,
/// prose before or after the JSON value, and trailing commas inside objects
/// or arrays.
pub fn clean_model_json(raw: &str) -> String {
    let mut text = raw.trim();

    // ```json ... ``` or bare ``` fences
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text = text.trim();

    // Narrow to the outermost JSON value when the model added prose around it
    let span = outermost_json_span(text).unwrap_or(text);

    strip_trailing_commas(span)
}

/// Find the widest `{...}` or `[...]` span in the text
fn outermost_json_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let open = text.as_bytes()[start];
    let close = if open == b'{' { '}' } else { ']' };
    let end = text.rfind(close)?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Remove commas that directly precede a closing brace or bracket
///
/// String contents are left untouched; only structural commas are dropped.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_comma = false;

    for c in text.chars() {
        if in_string {
            if pending_comma {
                out.push(',');
                pending_comma = false;
            }
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                if pending_comma {
                    out.push(',');
                    pending_comma = false;
                }
                in_string = true;
                out.push(c);
            }
            ',' => {
                if pending_comma {
                    out.push(',');
                }
                pending_comma = true;
            }
            '}' | ']' => {
                // The held comma was trailing, drop it
                pending_comma = false;
                out.push(c);
            }
            c if c.is_whitespace() => {
                // Hold whitespace decisions until we see what follows the comma
                if !pending_comma {
                    out.push(c);
                }
            }
            _ => {
                if pending_comma {
                    out.push(',');
                    pending_comma = false;
                }
                out.push(c);
            }
        }
    }

    if pending_comma {
        out.push(',');
    }

    out
}
