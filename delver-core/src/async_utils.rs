//! Async utilities and patterns
//!
//! Provides the retry policy, timeout wrapper and the process-wide concurrency
//! gate used by the research engine.

use crate::error::{DelverError, DelverResult};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, warn};

/// Retry configuration
///
/// The schedule is deliberately flat: a short fixed delay between attempts,
/// matching the behavior expected by the LLM call sites.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: usize,
    /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

/// Retry an async operation with a fixed delay.
///
/// Only errors reporting `is_recoverable()` are retried; a fatal error (for
/// example malformed model output) propagates immediately. The last attempt's
/// failure propagates to the caller.
pub async fn retry_async<F, T>(
    operation: F,
    config: RetryConfig,
    operation_name: &str,
) -> DelverResult<T>
where
    F: Fn() -> BoxFuture<'static, DelverResult<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) if !err.is_recoverable() => {
                error!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %err,
                    "Operation failed with non-retryable error"
                );
                return Err(err);
            }
            Err(err) => {
                if attempt >= config.max_attempts {
                    error!(
                        operation = operation_name,
                        attempt = attempt,
                        error = %err,
                        "Operation failed after all retry attempts"
                    );
                    return Err(err);
                }

                let delay = err.retry_delay_ms().unwrap_or(config.delay_ms);
                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %err,
                    delay_ms = delay,
                    "Operation failed, retrying"
                );
                sleep(Duration::from_millis(delay)).await;
            }
        }
    }
}

/// Timeout wrapper for async operations
pub async fn with_timeout<F, T>(future: F, timeout_ms: u64, operation_name: &str) -> DelverResult<T>
where
    F: std::future::Future<Output = DelverResult<T>>,
{
    match timeout(Duration::from_millis(timeout_ms), future).await {
        Ok(result) => result,
        Err(_) => Err(DelverError::Timeout {
            operation: operation_name.to_string(),
            duration_ms: timeout_ms,
        }),
    }
}

/// Process-wide counting gate bounding concurrent in-flight research branches.
///
/// One shared instance exists per engine; deep recursion reuses it by
/// reference, so nested fan-out cannot multiply concurrent external calls
/// beyond the limit. Permits are RAII: a branch that fails after acquiring
/// still releases on drop.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    limit: usize,
    in_flight: Arc<AtomicUsize>,
    high_water: Arc<AtomicUsize>,
}

impl ConcurrencyGate {
    /// Create a gate with the given concurrency limit
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
            in_flight: Arc::new(AtomicUsize::new(0)),
            high_water: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Acquire a permit, waiting if the gate is saturated
    pub async fn acquire(&self) -> DelverResult<GatePermit> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| DelverError::Internal {
                message: format!("Failed to acquire gate permit: {}", e),
                source: Some(Box::new(e)),
            })?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);

        Ok(GatePermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Configured limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of branches currently past the gate
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of branches ever simultaneously past the gate
    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

/// RAII guard for gate permits
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
