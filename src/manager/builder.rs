use std::sync::Arc;

use crate::{
    config::Config,
    stream::EventTransport,
    subscribers::{Subscribe, SubscriberSet},
};
use super::manager::EventManager;

/// Builder for constructing an [`EventManager`] with optional observers.
pub struct EventManagerBuilder {
    cfg: Config,
    transport: Arc<dyn EventTransport>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl EventManagerBuilder {
    /// Creates a new builder over `transport`.
    pub fn new(transport: Arc<dyn EventTransport>, cfg: Config) -> Self {
        Self {
            cfg,
            transport,
            subscribers: Vec::new(),
        }
    }

    /// Sets observers for manager lifecycle events.
    ///
    /// Observers receive events (stream lifecycle, registrations, handler
    /// outcomes) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one observer.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the manager. Nothing is opened until the first registration or
    /// `receive` call.
    ///
    /// Must be called inside a tokio runtime when observers are configured.
    pub fn build(self) -> Arc<EventManager> {
        let observers = SubscriberSet::new(self.subscribers);
        Arc::new(EventManager::new_internal(&self.cfg, self.transport, observers))
    }
}
