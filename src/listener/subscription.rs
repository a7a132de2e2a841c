//! Subscriptions and their per-subscription seen-sets.

use crate::models::{BatchType, StatusDocument};
use std::collections::HashSet;
use std::time::Duration;

/// Default pause between two polls of the same subscription.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(4);
/// Default number of documents requested per poll.
pub const DEFAULT_LIMIT: u32 = 20;

/// A watch on one document status, optionally restricted to a batch type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    status: StatusDocument,
    batch_type: Option<BatchType>,
    interval: Duration,
    limit: u32,
}

impl Subscription {
    /// Watch `status` across all batch types with the default interval and limit.
    pub fn new(status: StatusDocument) -> Self {
        Self {
            status,
            batch_type: None,
            interval: DEFAULT_INTERVAL,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Only watch documents of the given batch type.
    pub fn with_batch_type(mut self, batch_type: BatchType) -> Self {
        self.batch_type = Some(batch_type);
        self
    }

    /// Pause between polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Documents requested per poll.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Watched status.
    pub fn status(&self) -> StatusDocument {
        self.status
    }

    /// Batch type filter.
    pub fn batch_type(&self) -> Option<BatchType> {
        self.batch_type
    }

    /// Pause between polls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Documents requested per poll.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("poll interval must be greater than zero".to_string());
        }
        if self.limit == 0 {
            return Err("document limit must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Identifiers already delivered for one subscription. Never shrinks.
#[derive(Debug, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    /// Record `id`, returning `true` when it was not seen before.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    /// Whether `id` was already delivered.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of delivered identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing was delivered yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
