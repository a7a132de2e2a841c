//! Concurrent polling of every registered subscription.

use crate::client::{ClientError, Transport};
use crate::listener::cycle::PollCycle;
use crate::listener::handler::{Callbacks, HandlerError, ListenerHandler};
use crate::listener::subscription::Subscription;
use crate::metrics::{ListenerMetrics, ListenerMetricsSnapshot};
use crate::models::{Document, StatusDocument};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

/// Lifecycle of a listener engine. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Accepting subscriptions, not polling yet.
    Idle,
    /// Polling every subscription.
    Running,
    /// Stopped for good.
    Stopped,
}

/// Errors returned by the listener engine.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// `run` was called before any subscription was registered.
    #[error("no subscriptions registered")]
    NoSubscriptions,
    /// `run` was called while the engine was already running.
    #[error("listener is already running")]
    AlreadyRunning,
    /// The engine was stopped and cannot be reused.
    #[error("listener has been stopped")]
    AlreadyStopped,
    /// A subscription was rejected at registration.
    #[error("invalid subscription: {0}")]
    InvalidSubscription(String),
    /// A transport error that retrying cannot fix ended at least one subscription.
    #[error("listener aborted: {0}")]
    Transport(#[from] ClientError),
}

enum LoopExit {
    Stopped,
    Fatal(ClientError),
}

struct Shared {
    state: Mutex<ListenerState>,
    stop_tx: watch::Sender<bool>,
    pending_tx: mpsc::UnboundedSender<Subscription>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ListenerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_listener(&self, subscription: Subscription) -> Result<(), ListenerError> {
        subscription
            .validate()
            .map_err(ListenerError::InvalidSubscription)?;
        let state = self.state();
        if *state == ListenerState::Stopped {
            return Err(ListenerError::AlreadyStopped);
        }
        tracing::info!(
            status = %subscription.status(),
            batch_type = ?subscription.batch_type(),
            interval_ms = subscription.interval().as_millis() as u64,
            limit = subscription.limit(),
            running = *state == ListenerState::Running,
            "Subscription registered"
        );
        self.pending_tx
            .send(subscription)
            .map_err(|_| ListenerError::AlreadyStopped)
    }

    fn stop(&self) {
        let mut state = self.state();
        if *state != ListenerState::Stopped {
            tracing::info!(previous = ?*state, "Stopping listener");
            *state = ListenerState::Stopped;
        }
        self.stop_tx.send_replace(true);
    }
}

/// Cloneable control surface for a running engine.
#[derive(Clone)]
pub struct ListenerHandle {
    shared: Arc<Shared>,
}

impl ListenerHandle {
    /// Stop polling. Idempotent.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Register a subscription; while running it starts polling right away.
    pub fn add_listener(&self, subscription: Subscription) -> Result<(), ListenerError> {
        self.shared.add_listener(subscription)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ListenerState {
        *self.shared.state()
    }
}

/// Polls the service for every subscription and hands new documents to the caller.
///
/// Each subscription runs on its own task with its own seen-set, so a slow or failing
/// subscription never delays another. Documents are delivered synchronously from the polling
/// task: a subscription does not poll again until its callbacks return.
pub struct ListenerEngine<T: ?Sized> {
    transport: Arc<T>,
    callbacks: Callbacks,
    custom: Option<Arc<dyn ListenerHandler>>,
    shared: Arc<Shared>,
    pending_rx: Mutex<Option<mpsc::UnboundedReceiver<Subscription>>>,
    metrics: Arc<ListenerMetrics>,
}

impl<T> ListenerEngine<T>
where
    T: Transport + ?Sized + 'static,
{
    /// Build an idle engine over a shared transport.
    pub fn new(transport: Arc<T>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            callbacks: Callbacks::default(),
            custom: None,
            shared: Arc::new(Shared {
                state: Mutex::new(ListenerState::Idle),
                stop_tx,
                pending_tx,
            }),
            pending_rx: Mutex::new(Some(pending_rx)),
            metrics: Arc::new(ListenerMetrics::new()),
        }
    }

    /// Register a subscription. Allowed while idle or running.
    pub fn add_listener(&self, subscription: Subscription) -> Result<(), ListenerError> {
        self.shared.add_listener(subscription)
    }

    /// Route every event to `handler` instead of the closure callbacks.
    pub fn set_handler<H>(&mut self, handler: H)
    where
        H: ListenerHandler + 'static,
    {
        self.custom = Some(Arc::new(handler));
    }

    /// Called once per newly observed document.
    pub fn set_on_document_handler<F>(&mut self, callback: F)
    where
        F: Fn(StatusDocument, &Document) + Send + Sync + 'static,
    {
        self.callbacks.set_on_document(callback);
    }

    /// Called once per subscription when it starts polling.
    pub fn set_on_listener_start_handler<F>(&mut self, callback: F)
    where
        F: Fn(StatusDocument) + Send + Sync + 'static,
    {
        self.callbacks.set_on_listener_start(callback);
    }

    /// Control surface usable from other tasks while `run` is pending.
    pub fn handle(&self) -> ListenerHandle {
        ListenerHandle {
            shared: self.shared.clone(),
        }
    }

    /// Stop polling. Idempotent; an idle engine goes straight to stopped.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ListenerState {
        *self.shared.state()
    }

    /// Counters accumulated across every subscription.
    pub fn metrics_snapshot(&self) -> ListenerMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Poll until `stop` is called or the process receives Ctrl-C.
    pub async fn run(&self) -> Result<(), ListenerError> {
        self.run_until(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %error, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            tracing::info!("Ctrl-C received");
        })
        .await
    }

    /// Poll until `stop` is called or `shutdown` resolves.
    ///
    /// Returns once every subscription task has finished. A fetch already in flight when stop
    /// is requested completes and delivers before its task exits; a pending sleep is cut short.
    /// An unrecoverable fetch error ends only the subscription that hit it; the first such error
    /// is returned once the engine stops, or as soon as no subscription is left polling.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), ListenerError>
    where
        F: Future<Output = ()>,
    {
        let (mut pending, initial) = self.begin()?;
        let handler: Arc<dyn ListenerHandler> = match &self.custom {
            Some(custom) => custom.clone(),
            None => Arc::new(self.callbacks.clone()),
        };

        let mut stop_rx = self.shared.stop_tx.subscribe();
        let mut tasks = JoinSet::new();
        for subscription in initial {
            self.spawn(&mut tasks, subscription, handler.clone());
        }
        tracing::info!(subscriptions = tasks.len(), "Listener running");

        tokio::pin!(shutdown);
        let mut failure = None;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = stopped(&mut stop_rx) => break,
                Some(subscription) = pending.recv() => {
                    self.spawn(&mut tasks, subscription, handler.clone());
                }
                Some(joined) = tasks.join_next() => {
                    if let Some(error) = exit_error(joined) {
                        failure.get_or_insert(error);
                    }
                    if tasks.is_empty() {
                        while let Ok(subscription) = pending.try_recv() {
                            self.spawn(&mut tasks, subscription, handler.clone());
                        }
                        if tasks.is_empty() {
                            tracing::error!("Every subscription ended, stopping listener");
                            break;
                        }
                    }
                }
            }
        }

        self.shared.stop();
        while let Some(joined) = tasks.join_next().await {
            if let Some(error) = exit_error(joined) {
                failure.get_or_insert(error);
            }
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            cycles = snapshot.cycles,
            failed_cycles = snapshot.failed_cycles,
            documents = snapshot.documents_delivered,
            "Listener stopped"
        );
        match failure {
            Some(error) => Err(ListenerError::Transport(error)),
            None => Ok(()),
        }
    }

    /// Move from idle to running and take the subscriptions registered so far.
    fn begin(
        &self,
    ) -> Result<(mpsc::UnboundedReceiver<Subscription>, Vec<Subscription>), ListenerError> {
        let mut state = self.shared.state();
        match *state {
            ListenerState::Running => return Err(ListenerError::AlreadyRunning),
            ListenerState::Stopped => return Err(ListenerError::AlreadyStopped),
            ListenerState::Idle => {}
        }

        let mut slot = self
            .pending_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(mut pending) = slot.take() else {
            return Err(ListenerError::AlreadyRunning);
        };
        let mut initial = Vec::new();
        while let Ok(subscription) = pending.try_recv() {
            initial.push(subscription);
        }
        if initial.is_empty() {
            *slot = Some(pending);
            return Err(ListenerError::NoSubscriptions);
        }

        *state = ListenerState::Running;
        Ok((pending, initial))
    }

    fn spawn(
        &self,
        tasks: &mut JoinSet<LoopExit>,
        subscription: Subscription,
        handler: Arc<dyn ListenerHandler>,
    ) {
        tasks.spawn(poll_subscription(
            self.transport.clone(),
            subscription,
            handler,
            self.metrics.clone(),
            self.shared.stop_tx.subscribe(),
        ));
    }
}

async fn poll_subscription<T>(
    transport: Arc<T>,
    subscription: Subscription,
    handler: Arc<dyn ListenerHandler>,
    metrics: Arc<ListenerMetrics>,
    mut stop_rx: watch::Receiver<bool>,
) -> LoopExit
where
    T: Transport + ?Sized,
{
    let status = subscription.status();
    let interval = subscription.interval();
    invoke(&metrics, status, "listener_start", || {
        handler.on_listener_start(status)
    });

    let mut cycle = PollCycle::new(subscription);
    loop {
        let stop = *stop_rx.borrow_and_update();
        if stop {
            return LoopExit::Stopped;
        }

        match cycle.fetch(transport.as_ref()).await {
            Ok(documents) => {
                for document in &documents {
                    invoke(&metrics, status, "document", || {
                        handler.on_document(status, document)
                    });
                }
                metrics.record_cycle(documents.len() as u64);
            }
            Err(error) if error.is_fatal() => {
                metrics.record_failed_cycle();
                tracing::error!(%status, error = %error, "Poll failed, ending subscription");
                return LoopExit::Fatal(error);
            }
            Err(error) => {
                metrics.record_failed_cycle();
                tracing::warn!(%status, error = %error, "Poll failed, retrying next cycle");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = stopped(&mut stop_rx) => return LoopExit::Stopped,
        }
    }
}

fn invoke<F>(metrics: &ListenerMetrics, status: StatusDocument, event: &'static str, call: F)
where
    F: FnOnce() -> Result<(), HandlerError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            metrics.record_handler_failure();
            tracing::warn!(%status, event, error = %error, "Listener callback failed");
        }
        Err(_) => {
            metrics.record_handler_failure();
            tracing::error!(%status, event, "Listener callback panicked");
        }
    }
}

async fn stopped(stop_rx: &mut watch::Receiver<bool>) {
    loop {
        let stop = *stop_rx.borrow_and_update();
        if stop || stop_rx.changed().await.is_err() {
            return;
        }
    }
}

fn exit_error(joined: Result<LoopExit, tokio::task::JoinError>) -> Option<ClientError> {
    match joined {
        Ok(LoopExit::Stopped) => None,
        Ok(LoopExit::Fatal(error)) => Some(error),
        Err(error) => {
            tracing::error!(error = %error, "Subscription task aborted");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::handler::channel;
    use crate::test_support::{FetchStep, ScriptedTransport};
    use futures_util::{pin_mut, stream::StreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    type Received = mpsc::UnboundedReceiver<(StatusDocument, String)>;

    fn fast(status: StatusDocument) -> Subscription {
        Subscription::new(status).with_interval(Duration::from_millis(10))
    }

    fn recording_engine(transport: Arc<ScriptedTransport>) -> (ListenerEngine<ScriptedTransport>, Received) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut engine = ListenerEngine::new(transport);
        engine.set_on_document_handler(move |status, doc| {
            let _ = tx.send((status, doc.id.clone()));
        });
        (engine, rx)
    }

    fn start(
        engine: ListenerEngine<ScriptedTransport>,
    ) -> (ListenerHandle, JoinHandle<(Result<(), ListenerError>, ListenerMetricsSnapshot)>) {
        let handle = engine.handle();
        let task = tokio::spawn(async move {
            let result = engine.run_until(std::future::pending()).await;
            (result, engine.metrics_snapshot())
        });
        (handle, task)
    }

    async fn next_ids(rx: &mut Received, count: usize) -> Vec<String> {
        let mut ids = Vec::new();
        for _ in 0..count {
            let (_, id) = timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("delivery in time")
                .expect("channel open");
            ids.push(id);
        }
        ids
    }

    #[tokio::test]
    async fn delivers_each_document_once_across_cycles() {
        let transport = Arc::new(ScriptedTransport::new().script_fetches(
            StatusDocument::WaitingQa,
            [
                FetchStep::Page(vec!["A", "B"]),
                FetchStep::Page(vec!["A", "B", "C"]),
            ],
        ));
        let (engine, mut rx) = recording_engine(transport.clone());
        engine.add_listener(fast(StatusDocument::WaitingQa)).unwrap();
        let (handle, task) = start(engine);

        assert_eq!(next_ids(&mut rx, 3).await, ["A", "B", "C"]);
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop();

        let (result, metrics) = task.await.unwrap();
        assert!(result.is_ok());
        assert!(rx.try_recv().is_err());
        assert_eq!(metrics.documents_delivered, 3);
        assert_eq!(handle.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn failed_cycle_is_retried_on_next_tick() {
        let transport = Arc::new(ScriptedTransport::new().script_fetches(
            StatusDocument::Complete,
            [FetchStep::Fail, FetchStep::Page(vec!["A"])],
        ));
        let (engine, mut rx) = recording_engine(transport);
        engine.add_listener(fast(StatusDocument::Complete)).unwrap();
        let (handle, task) = start(engine);

        assert_eq!(next_ids(&mut rx, 1).await, ["A"]);
        handle.stop();

        let (result, metrics) = task.await.unwrap();
        assert!(result.is_ok());
        assert!(metrics.failed_cycles >= 1);
    }

    #[tokio::test]
    async fn stop_lets_in_flight_fetch_deliver_then_halts() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .with_fetch_delay(Duration::from_millis(60))
                .script_fetches(StatusDocument::WaitingQa, [FetchStep::Page(vec!["A"])]),
        );
        let (engine, mut rx) = recording_engine(transport.clone());
        engine.add_listener(fast(StatusDocument::WaitingQa)).unwrap();
        let (handle, task) = start(engine);

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.stop();
        let (result, _) = task.await.unwrap();
        assert!(result.is_ok());

        assert_eq!(next_ids(&mut rx, 1).await, ["A"]);
        let calls = transport.fetch_calls();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(transport.fetch_calls(), calls);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn panicking_callback_does_not_end_subscription() {
        let transport = Arc::new(ScriptedTransport::new().script_fetches(
            StatusDocument::WaitingQa,
            [FetchStep::Page(vec!["A", "B"]), FetchStep::Page(vec!["C"])],
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = ListenerEngine::new(transport);
        engine.set_on_document_handler(move |status, doc| {
            if doc.id == "A" {
                panic!("callback failure");
            }
            let _ = tx.send((status, doc.id.clone()));
        });
        engine.add_listener(fast(StatusDocument::WaitingQa)).unwrap();
        let (handle, task) = start(engine);

        assert_eq!(next_ids(&mut rx, 2).await, ["B", "C"]);
        handle.stop();

        let (result, metrics) = task.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(metrics.handler_failures, 1);
    }

    #[tokio::test]
    async fn subscriptions_keep_separate_seen_sets() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .script_fetches(StatusDocument::WaitingQa, [FetchStep::Page(vec!["A"])])
                .script_fetches(StatusDocument::Complete, [FetchStep::Page(vec!["A"])]),
        );
        let started = Arc::new(AtomicUsize::new(0));
        let (mut engine, mut rx) = recording_engine(transport);
        let counter = started.clone();
        engine.set_on_listener_start_handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        engine.add_listener(fast(StatusDocument::WaitingQa)).unwrap();
        engine.add_listener(fast(StatusDocument::Complete)).unwrap();
        let (handle, task) = start(engine);

        let mut seen = Vec::new();
        for _ in 0..2 {
            seen.push(timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap());
        }
        seen.sort_by_key(|(status, _)| status.as_str());
        handle.stop();
        task.await.unwrap().0.unwrap();

        assert_eq!(
            seen,
            [
                (StatusDocument::Complete, "A".to_string()),
                (StatusDocument::WaitingQa, "A".to_string()),
            ]
        );
        assert_eq!(started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn subscription_added_while_running_starts_polling() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .script_fetches(StatusDocument::WaitingQa, [FetchStep::Page(vec!["A"])])
                .script_fetches(StatusDocument::ErrorLink, [FetchStep::Page(vec!["E"])]),
        );
        let (engine, mut rx) = recording_engine(transport);
        engine.add_listener(fast(StatusDocument::WaitingQa)).unwrap();
        let (handle, task) = start(engine);

        assert_eq!(next_ids(&mut rx, 1).await, ["A"]);
        assert_eq!(handle.state(), ListenerState::Running);
        handle.add_listener(fast(StatusDocument::ErrorLink)).unwrap();
        assert_eq!(next_ids(&mut rx, 1).await, ["E"]);

        handle.stop();
        task.await.unwrap().0.unwrap();
        assert!(matches!(
            handle.add_listener(fast(StatusDocument::ErrorLink)),
            Err(ListenerError::AlreadyStopped)
        ));
    }

    #[tokio::test]
    async fn run_without_subscriptions_is_rejected() {
        let engine = ListenerEngine::new(Arc::new(ScriptedTransport::new()));
        let result = engine.run_until(std::future::pending()).await;
        assert!(matches!(result, Err(ListenerError::NoSubscriptions)));
        assert_eq!(engine.state(), ListenerState::Idle);
    }

    #[tokio::test]
    async fn invalid_subscription_is_rejected() {
        let engine = ListenerEngine::new(Arc::new(ScriptedTransport::new()));
        let result = engine.add_listener(Subscription::new(StatusDocument::Complete).with_limit(0));
        assert!(matches!(result, Err(ListenerError::InvalidSubscription(_))));
    }

    #[tokio::test]
    async fn stopped_engine_cannot_run() {
        let engine = ListenerEngine::new(Arc::new(ScriptedTransport::new()));
        engine.add_listener(fast(StatusDocument::Complete)).unwrap();
        engine.stop();
        engine.stop();
        let result = engine.run_until(std::future::pending()).await;
        assert!(matches!(result, Err(ListenerError::AlreadyStopped)));
    }

    #[tokio::test]
    async fn rejected_subscription_leaves_siblings_polling() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .script_fetches(StatusDocument::WaitingQa, [FetchStep::Unauthorized])
                .script_fetches(
                    StatusDocument::Complete,
                    [FetchStep::Page(vec![]), FetchStep::Page(vec!["A"])],
                ),
        );
        let (engine, mut rx) = recording_engine(transport.clone());
        engine.add_listener(fast(StatusDocument::WaitingQa)).unwrap();
        engine.add_listener(fast(StatusDocument::Complete)).unwrap();
        let (handle, task) = start(engine);

        let (status, id) = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("delivery in time")
            .expect("channel open");
        assert_eq!((status, id.as_str()), (StatusDocument::Complete, "A"));
        assert_eq!(handle.state(), ListenerState::Running);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let rejected_polls = transport
            .seen_filters()
            .iter()
            .filter(|(status, ..)| *status == StatusDocument::WaitingQa)
            .count();
        assert_eq!(rejected_polls, 1);

        handle.stop();
        let (result, _) = task.await.unwrap();
        assert!(matches!(
            result,
            Err(ListenerError::Transport(ClientError::Unauthorized { .. }))
        ));
    }

    #[tokio::test]
    async fn run_ends_once_every_subscription_is_rejected() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .script_fetches(StatusDocument::WaitingQa, [FetchStep::Unauthorized])
                .script_fetches(StatusDocument::Complete, [FetchStep::Unauthorized]),
        );
        let engine = ListenerEngine::new(transport);
        engine.add_listener(fast(StatusDocument::WaitingQa)).unwrap();
        engine.add_listener(fast(StatusDocument::Complete)).unwrap();

        let result = timeout(Duration::from_secs(2), engine.run_until(std::future::pending()))
            .await
            .expect("listener exits on its own");

        assert!(matches!(
            result,
            Err(ListenerError::Transport(ClientError::Unauthorized { .. }))
        ));
        assert_eq!(engine.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn shutdown_future_ends_run() {
        let engine = ListenerEngine::new(Arc::new(ScriptedTransport::new()));
        engine.add_listener(fast(StatusDocument::Complete)).unwrap();
        let result = engine
            .run_until(tokio::time::sleep(Duration::from_millis(30)))
            .await;
        assert!(result.is_ok());
        assert_eq!(engine.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn custom_handler_takes_precedence_over_callbacks() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .script_fetches(StatusDocument::Complete, [FetchStep::Page(vec!["A", "B"])]),
        );
        let (mut engine, mut closure_rx) = recording_engine(transport);
        let (handler, deliveries) = channel();
        engine.set_handler(handler);
        engine.add_listener(fast(StatusDocument::Complete)).unwrap();
        let (handle, task) = start(engine);

        pin_mut!(deliveries);
        let mut ids = Vec::new();
        for _ in 0..2 {
            let delivery = timeout(Duration::from_secs(2), deliveries.next())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(delivery.status, StatusDocument::Complete);
            ids.push(delivery.document.id);
        }
        handle.stop();
        task.await.unwrap().0.unwrap();

        assert_eq!(ids, ["A", "B"]);
        assert!(closure_rx.try_recv().is_err());
    }
}
