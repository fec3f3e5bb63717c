//! Instrumented in-memory resolver for testing.

use super::{Label, LabelResolver};
use crate::code::Code;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// One recorded [`resolve`](LabelResolver::resolve) call.
#[derive(Debug, Clone)]
pub struct Call {
    pub code: Code,
    pub started: Instant,
    pub finished: Instant,
}

/// Resolver answering from a fixed table, recording every call.
///
/// Codes missing from the table resolve to [`Label::fallback`]. An optional
/// latency keeps each call in flight long enough for concurrency limits to
/// be observable through [`peak_in_flight`](Self::peak_in_flight).
#[derive(Debug, Default)]
pub struct MockResolver {
    labels: HashMap<String, Label>,
    latency: Duration,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(labels: impl IntoIterator<Item = (impl Into<String>, impl Into<Label>)>) -> Self {
        Self {
            labels: labels.into_iter().map(|(code, label)| (code.into(), label.into())).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Calls recorded so far, in order of completion.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Highest number of calls that were ever in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LabelResolver for MockResolver {
    async fn resolve(&self, code: &Code) -> Label {
        let started = Instant::now();
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let label = self.labels.get(code.as_str()).cloned().unwrap_or_else(Label::fallback);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let call = Call {
            code: code.clone(),
            started,
            finished: Instant::now(),
        };
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
        label
    }
}
