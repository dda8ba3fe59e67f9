//! Application state - Dependency injection container.

use std::sync::Arc;
use std::time::Duration;

use crate::infra::UserRepository;
use crate::services::{UserDirectory, UserService};

/// Application state shared across handlers.
///
/// Holds the only shared resource of the request path: the user service,
/// which in turn owns the store handle.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
}

impl AppState {
    /// Create application state from an already-built service.
    pub fn new(user_service: Arc<dyn UserService>) -> Self {
        Self { user_service }
    }

    /// Wire a [`UserDirectory`] over the given store.
    pub fn from_repository(repo: Arc<dyn UserRepository>, store_timeout: Duration) -> Self {
        Self::new(Arc::new(UserDirectory::new(repo, store_timeout)))
    }
}
