//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use event_store::EventStore;
use serde::Serialize;

use crate::routes::events::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Namespaces accepted for submitted documents.
    pub namespaces: Vec<String>,
}

/// GET /health: reports liveness and the loaded schema namespaces.
pub async fn check<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    let namespaces = state
        .handler
        .guard()
        .registry()
        .namespaces()
        .map(str::to_string)
        .collect();

    Json(HealthResponse {
        status: "ok",
        namespaces,
    })
}
