//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::persistence::Store;
use crate::service::{AlertService, IngestService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Domain store for read paths.
    pub store: Arc<dyn Store>,
    /// Measurement ingestion pipeline.
    pub ingest: IngestService,
    /// Alert lifecycle manager.
    pub alerts: AlertService,
    /// Access token signing and verification keys.
    pub tokens: TokenKeys,
}
