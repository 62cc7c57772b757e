//! Per-identity connection managers owned by the application context.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::Result;
use crate::ws::config::Config;
use crate::ws::{ConnectionManager, Connector};

/// Map from client id to its [`ConnectionManager`].
///
/// Each identity gets its own manager, so sessions never share connection
/// state and several identities can be connected at once.
pub struct ConnectionRegistry {
    endpoint: String,
    config: Config,
    connector: Arc<dyn Connector>,
    managers: DashMap<String, ConnectionManager>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new<C: Connector>(endpoint: &str, config: Config, connector: C) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            config,
            connector: Arc::new(connector),
            managers: DashMap::new(),
        }
    }

    /// The manager for `client_id`, created on first use.
    ///
    /// # Panics
    ///
    /// Panics if a manager has to be created outside a tokio runtime.
    pub fn get_or_create(&self, client_id: &str) -> Result<ConnectionManager> {
        match self.managers.entry(client_id.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let manager = ConnectionManager::with_identity(
                    &self.endpoint,
                    self.config.clone(),
                    Some(client_id.to_owned()),
                    Arc::clone(&self.connector),
                )?;
                entry.insert(manager.clone());
                Ok(manager)
            }
        }
    }

    #[must_use]
    pub fn get(&self, client_id: &str) -> Option<ConnectionManager> {
        self.managers.get(client_id).map(|entry| entry.value().clone())
    }

    /// Disconnect and forget the manager for `client_id`.
    pub async fn remove(&self, client_id: &str) -> bool {
        let Some((_, manager)) = self.managers.remove(client_id) else {
            return false;
        };
        manager.disconnect().await;
        true
    }

    /// Disconnect every manager and empty the registry.
    pub async fn disconnect_all(&self) {
        let ids: Vec<String> = self.managers.iter().map(|entry| entry.key().clone()).collect();
        for id in ids {
            self.remove(&id).await;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("endpoint", &self.endpoint)
            .field("managers", &self.managers.len())
            .finish_non_exhaustive()
    }
}
