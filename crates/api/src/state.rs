use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (persons and language sessions).
    pub pool: cards_db::DbPool,
    /// Server configuration (locale and media directories, limits).
    pub config: Arc<ServerConfig>,
}
