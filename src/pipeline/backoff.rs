// src/pipeline/backoff.rs

//! Backoff policy for the crawl loop.
//!
//! Two tiers with very different wait magnitudes: an empty batch usually
//! means content has not rendered yet and deserves a short poll, while a
//! throttle signal means the surface is rate limiting us and anything short
//! of a long wait makes it worse. Both tiers are bounded; running out of
//! attempts ends the crawl as exhausted, not as an error.
//!
//! The policy is a plain value with no driver dependency. The crawl
//! controller feeds it one observation per batch and acts on the returned
//! action.

/// Counters threaded through the crawl loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackoffState {
    pub consecutive_empty_batches: u32,
    pub refresh_count: u32,
    pub retry_count: u32,
}

/// What the crawl loop should do after the latest batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffAction {
    /// New content arrived; keep going immediately
    Continue,
    /// Empty batch; wait the short poll interval
    Wait,
    /// Too many empty batches; reload the target view
    Refresh,
    /// Throttle signal; wait the long interval, then invoke recovery
    ThrottleWait,
    /// Attempt budget spent; end the crawl cleanly
    Exhausted,
}

/// Bounded two-tier backoff policy.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    state: BackoffState,
    empty_batch_limit: u32,
    refresh_limit: u32,
    throttle_retry_limit: u32,
}

impl BackoffPolicy {
    pub fn new(empty_batch_limit: u32, refresh_limit: u32, throttle_retry_limit: u32) -> Self {
        Self {
            state: BackoffState::default(),
            empty_batch_limit,
            refresh_limit,
            throttle_retry_limit,
        }
    }

    pub fn state(&self) -> BackoffState {
        self.state
    }

    /// Record the outcome of a crawl batch and decide the next step.
    pub fn observe(&mut self, new_items: usize, throttled: bool) -> BackoffAction {
        if new_items > 0 {
            self.state = BackoffState::default();
            return BackoffAction::Continue;
        }

        if throttled {
            if self.state.retry_count >= self.throttle_retry_limit {
                return BackoffAction::Exhausted;
            }
            self.state.retry_count += 1;
            return BackoffAction::ThrottleWait;
        }

        self.state.consecutive_empty_batches += 1;
        if self.state.consecutive_empty_batches >= self.empty_batch_limit {
            if self.state.refresh_count >= self.refresh_limit {
                return BackoffAction::Exhausted;
            }
            self.state.refresh_count += 1;
            self.state.consecutive_empty_batches = 0;
            return BackoffAction::Refresh;
        }

        BackoffAction::Wait
    }

    /// The throttle signal cleared; further throttle observations start a
    /// fresh retry budget.
    pub fn throttle_cleared(&mut self) {
        self.state.retry_count = 0;
    }
}
