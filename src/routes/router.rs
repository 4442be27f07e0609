use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, list_disk_readings, list_scalar_readings};
use crate::storage::ReadStore;

pub fn create_router(store: Arc<dyn ReadStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/snmp", get(list_scalar_readings))
        .route("/snmp/disk", get(list_disk_readings))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
