//! # Mutation Sink
//!
//! The contract between graft and whatever executes statements against a
//! live database. The core only produces text; a sink applies it.
//!
//! ## Implementations
//!
//! | Sink | Description |
//! |------|-------------|
//! | `MemorySink` | Records schemas and submissions, for tests and dry runs |
//!
//! [`Uploader`] wraps any sink with a correlation index and retries
//! optimistic-concurrency aborts with randomized backoff.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;

use crate::config::RetryConfig;
use crate::mutation::{Mutation, Upsert};
use crate::{Error, Result};

// ============================================================================
// Response
// ============================================================================

/// Outcome of one committed request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub txn_id: u64,
    /// Number of mutations whose statements were applied.
    pub applied: usize,
}

// ============================================================================
// MutationSink Trait
// ============================================================================

/// A database endpoint accepting schema changes and upserts.
///
/// A single `submit` is one transaction attempt committed immediately.
/// Implementations report optimistic-concurrency conflicts as
/// [`Error::Aborted`]; anything else is a hard failure.
#[async_trait]
pub trait MutationSink: Send + Sync {
    /// Replace the server's schema.
    async fn alter(&self, schema: &str) -> Result<()>;

    /// Run a query and its conditional mutations in one transaction attempt.
    async fn submit(&self, query: &str, mutations: &[Mutation]) -> Result<Response>;
}

// ============================================================================
// Uploader
// ============================================================================

/// Retry policy for aborted transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(cfg: RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            max_backoff: Duration::from_millis(cfg.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Uniform random delay in `[0, max_backoff)` so concurrent submitters
    /// do not retry in lockstep.
    fn jitter(&self) -> Duration {
        let max = self.max_backoff.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max))
    }
}

/// A sink handle tagged with a caller-chosen index, so failures from many
/// concurrent uploaders can be told apart.
pub struct Uploader<S: MutationSink> {
    sink: S,
    idx: u64,
    policy: RetryPolicy,
}

impl<S: MutationSink> Uploader<S> {
    pub fn new(sink: S, idx: u64) -> Self {
        Self { sink, idx, policy: RetryPolicy::default() }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn idx(&self) -> u64 {
        self.idx
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Update the server's schema. Not retried.
    pub async fn set_schema(&self, schema: &str) -> Result<()> {
        self.sink.alter(schema).await.map_err(|e| self.failure(e))
    }

    /// Submit a query and mutations, retrying aborts up to the policy's
    /// attempt limit. Other errors are returned at once, tagged with `idx`.
    pub async fn transact(&self, query: &str, mutations: &[Mutation]) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.sink.submit(query, mutations).await {
                Ok(response) => return Ok(response),
                Err(Error::Aborted(reason)) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.jitter();
                    tracing::warn!(idx = self.idx, attempt, ?delay, %reason, "transaction aborted, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(Error::Aborted(reason)) => {
                    tracing::error!(idx = self.idx, attempt, %reason, "transaction aborted, giving up");
                    return Err(Error::SinkConflict { idx: self.idx, attempts: attempt });
                }
                Err(e) => return Err(self.failure(e)),
            }
        }
    }

    /// Submit a built upsert.
    pub async fn upsert(&self, upsert: &Upsert) -> Result<Response> {
        self.transact(&upsert.query, &upsert.mutations).await
    }

    fn failure(&self, source: Error) -> Error {
        tracing::error!(idx = self.idx, error = %source, "sink failure");
        Error::SinkFailure { idx: self.idx, source: Box::new(source) }
    }
}

// ============================================================================
// MemorySink
// ============================================================================

/// One recorded `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub query: String,
    pub mutations: Vec<Mutation>,
}

/// In-memory sink.
///
/// Applies nothing; it records what it was sent. Conflicts and failures can
/// be injected to exercise retry handling.
#[derive(Default)]
pub struct MemorySink {
    schemas: Mutex<Vec<String>>,
    submissions: Mutex<Vec<Submission>>,
    pending_aborts: AtomicU32,
    failure: Mutex<Option<String>>,
    next_txn_id: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the next `n` submissions with a conflict.
    pub fn abort_next(&self, n: u32) {
        self.pending_aborts.store(n, Ordering::SeqCst);
    }

    /// Fail every call with `message` until cleared.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    pub fn schemas(&self) -> Vec<String> {
        self.schemas.lock().clone()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.lock().as_ref() {
            Some(message) => Err(Error::Sink(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MutationSink for MemorySink {
    async fn alter(&self, schema: &str) -> Result<()> {
        self.check_failure()?;
        self.schemas.lock().push(schema.to_string());
        Ok(())
    }

    async fn submit(&self, query: &str, mutations: &[Mutation]) -> Result<Response> {
        self.check_failure()?;
        let aborted = self
            .pending_aborts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed) + 1;
        if aborted {
            return Err(Error::Aborted(format!("txn {txn_id} conflicted")));
        }
        self.submissions.lock().push(Submission {
            query: query.to_string(),
            mutations: mutations.to_vec(),
        });
        Ok(Response { txn_id, applied: mutations.len() })
    }
}
