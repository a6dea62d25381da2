use std::sync::Arc;

use carte_core::staging::StagingStore;
use carte_core::store::CatalogStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Durable catalog storage (PostgreSQL in production).
    pub store: Arc<dyn CatalogStore>,
    /// Per-caller transient staging area for draft batches.
    pub staging: StagingStore,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
