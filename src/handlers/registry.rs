//! # Handler registry keyed by event name.
//!
//! One registry per [`HandlerCategory`](crate::handlers::HandlerCategory).
//! Registering a name twice replaces the earlier handler.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::handlers::EventHandler;

/// Concurrent map from event name to handler.
pub struct HandlerRegistry<A> {
    handlers: RwLock<HashMap<String, Arc<dyn EventHandler<A>>>>,
}

impl<A> Default for HandlerRegistry<A> {
    fn default() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }
}

impl<A> HandlerRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handler` under `name`; returns true if it replaced another one.
    pub async fn insert(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn EventHandler<A>>,
    ) -> bool {
        self.handlers
            .write()
            .await
            .insert(name.into(), handler)
            .is_some()
    }

    /// Removes the handler for `name`; returns true if one was present.
    pub async fn remove(&self, name: &str) -> bool {
        self.handlers.write().await.remove(name).is_some()
    }

    /// Looks up the handler for `name`.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn EventHandler<A>>> {
        self.handlers.read().await.get(name).cloned()
    }
}
