//! Durable context storage seam
//!
//! Used only by context-loss recovery to attempt reloading a previously
//! persisted context. Absence or failure is non-fatal; the engine never
//! depends on a store being present.

use std::collections::HashMap;

use async_trait::async_trait;
use gauntlet_core::NavigationContext;
use tokio::sync::Mutex;

/// Get/set-by-key storage for navigation contexts
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Load a previously saved context, if one exists
    async fn load(&self, key: &str) -> Option<NavigationContext>;

    /// Persist a context under a key; returns whether the write succeeded
    async fn save(&self, key: &str, context: &NavigationContext) -> bool;
}

/// In-memory store, for hosts without durable storage and for tests
#[derive(Debug, Default)]
pub struct MemoryContextStore {
    entries: Mutex<HashMap<String, NavigationContext>>,
}

impl MemoryContextStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn load(&self, key: &str) -> Option<NavigationContext> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn save(&self, key: &str, context: &NavigationContext) -> bool {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), context.clone());
        true
    }
}
