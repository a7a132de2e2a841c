use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing listener activity.
#[derive(Default)]
pub struct ListenerMetrics {
    cycles: AtomicU64,
    failed_cycles: AtomicU64,
    documents_delivered: AtomicU64,
    handler_failures: AtomicU64,
}

impl ListenerMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished poll cycle and how many documents it delivered.
    pub fn record_cycle(&self, delivered: u64) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.documents_delivered
            .fetch_add(delivered, Ordering::Relaxed);
    }

    /// Record a poll cycle whose fetch failed.
    pub fn record_failed_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.failed_cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a callback that returned an error or panicked.
    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> ListenerMetricsSnapshot {
        ListenerMetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            failed_cycles: self.failed_cycles.load(Ordering::Relaxed),
            documents_delivered: self.documents_delivered.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of listener counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ListenerMetricsSnapshot {
    /// Poll cycles run across all subscriptions, failed ones included.
    pub cycles: u64,
    /// Poll cycles whose fetch failed.
    pub failed_cycles: u64,
    /// Documents handed to the document callback.
    pub documents_delivered: u64,
    /// Callback invocations that failed.
    pub handler_failures: u64,
}

/// Thread-safe counters describing upload activity.
#[derive(Default)]
pub struct UploadMetrics {
    attempts: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl UploadMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transport call.
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a file's terminal outcome.
    pub fn record_outcome(&self, success: bool) {
        let counter = if success {
            &self.succeeded
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> UploadMetricsSnapshot {
        UploadMetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of upload counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct UploadMetricsSnapshot {
    /// Transport calls made, retries included.
    pub attempts: u64,
    /// Files that ended with a document UUID.
    pub succeeded: u64,
    /// Files that exhausted their attempts.
    pub failed: u64,
}
