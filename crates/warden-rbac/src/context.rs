//! Per-request cancellation and deadlines.
//!
//! # Purpose
//! [`RequestContext`] travels with one admission decision. Every capability
//! call the checker makes is raced against its cancellation token and
//! deadline so a stale decision is abandoned promptly.
use crate::{RbacError, RbacResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Tie this context to a caller-owned token, e.g. one cancelled when the
    /// HTTP client disconnects.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `call` to completion unless the context is cancelled or its
    /// deadline passes first.
    pub async fn run<F, T>(&self, call: F) -> RbacResult<T>
    where
        F: Future<Output = RbacResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(RbacError::Cancelled);
        }
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(RbacError::Cancelled),
                    outcome = tokio::time::timeout_at(deadline, call) => match outcome {
                        Ok(result) => result,
                        Err(_) => Err(RbacError::DeadlineExceeded),
                    },
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(RbacError::Cancelled),
                    result = call => result,
                }
            }
        }
    }
}
