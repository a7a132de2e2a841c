//! Caller capabilities invoked by the listener engine.

use crate::models::{Document, StatusDocument};
use async_stream::stream;
use futures_core::Stream;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Error type callbacks may return; it is logged and otherwise ignored.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives listener events.
///
/// Methods run synchronously inside the delivering poll cycle, so a subscription does not poll
/// again until they return. Errors and panics are caught by the engine.
pub trait ListenerHandler: Send + Sync {
    /// Called once per newly observed document, in server order.
    fn on_document(&self, status: StatusDocument, document: &Document) -> Result<(), HandlerError>;

    /// Called once when a subscription starts polling.
    fn on_listener_start(&self, _status: StatusDocument) -> Result<(), HandlerError> {
        Ok(())
    }
}

type DocumentCallback = Arc<dyn Fn(StatusDocument, &Document) + Send + Sync>;
type StartCallback = Arc<dyn Fn(StatusDocument) + Send + Sync>;

/// Closure-backed handler; unset callbacks are no-ops.
#[derive(Clone, Default)]
pub struct Callbacks {
    on_document: Option<DocumentCallback>,
    on_listener_start: Option<StartCallback>,
}

impl Callbacks {
    /// Set the per-document callback.
    pub fn set_on_document<F>(&mut self, callback: F)
    where
        F: Fn(StatusDocument, &Document) + Send + Sync + 'static,
    {
        self.on_document = Some(Arc::new(callback));
    }

    /// Set the subscription start callback.
    pub fn set_on_listener_start<F>(&mut self, callback: F)
    where
        F: Fn(StatusDocument) + Send + Sync + 'static,
    {
        self.on_listener_start = Some(Arc::new(callback));
    }
}

impl ListenerHandler for Callbacks {
    fn on_document(&self, status: StatusDocument, document: &Document) -> Result<(), HandlerError> {
        if let Some(callback) = &self.on_document {
            callback(status, document);
        }
        Ok(())
    }

    fn on_listener_start(&self, status: StatusDocument) -> Result<(), HandlerError> {
        if let Some(callback) = &self.on_listener_start {
            callback(status);
        }
        Ok(())
    }
}

/// A document delivered by the listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Status of the subscription that observed the document.
    pub status: StatusDocument,
    /// The document itself.
    pub document: Document,
}

/// Handler that forwards deliveries into a queue.
#[derive(Clone)]
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<Delivery>,
}

impl ListenerHandler for ChannelHandler {
    fn on_document(&self, status: StatusDocument, document: &Document) -> Result<(), HandlerError> {
        self.sender
            .send(Delivery {
                status,
                document: document.clone(),
            })
            .map_err(|_| "delivery stream was dropped".into())
    }
}

/// Build a queue-backed handler and the stream that drains it.
///
/// The stream ends once the engine (and every clone of the handler) is dropped.
pub fn channel() -> (ChannelHandler, impl Stream<Item = Delivery> + Send + 'static) {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let deliveries = stream! {
        while let Some(delivery) = receiver.recv().await {
            yield delivery;
        }
    };
    (ChannelHandler { sender }, deliveries)
}
