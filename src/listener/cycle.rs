//! One fetch-and-filter pass for a subscription.

use crate::client::{ClientError, Transport};
use crate::listener::subscription::{SeenSet, Subscription};
use crate::models::Document;

/// A subscription together with its deduplication state.
#[derive(Debug)]
pub struct PollCycle {
    subscription: Subscription,
    seen: SeenSet,
}

impl PollCycle {
    /// Start with an empty seen-set.
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            seen: SeenSet::default(),
        }
    }

    /// The watched subscription.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Identifiers delivered so far.
    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Fetch the first page for the subscription and keep only documents not delivered before,
    /// in server order. A failed fetch leaves the seen-set untouched.
    pub async fn fetch<T>(&mut self, transport: &T) -> Result<Vec<Document>, ClientError>
    where
        T: Transport + ?Sized,
    {
        let page = transport
            .fetch_documents_by_status(
                self.subscription.status(),
                self.subscription.batch_type(),
                1,
                self.subscription.limit(),
            )
            .await?;

        let returned = page.documents.len();
        let fresh: Vec<Document> = page
            .documents
            .into_iter()
            .filter(|document| self.seen.insert(&document.id))
            .collect();

        tracing::debug!(
            status = %self.subscription.status(),
            returned,
            fresh = fresh.len(),
            seen = self.seen.len(),
            "Poll cycle finished"
        );
        Ok(fresh)
    }
}
