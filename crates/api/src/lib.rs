//! HTTP entry API for cultural events.
//!
//! Accepts CdbXML documents and form requests, dispatches them as commands
//! and answers with `rsp` documents. Structured logging uses tracing and
//! metrics are exposed for Prometheus.

pub mod config;
pub mod error;
pub mod routes;
pub mod rsp;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use cdbxml::{DocumentGuard, RegistryError};
use domain::{EventCommandHandler, EventSourcedRepository};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::events::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/event", post(routes::events::create::<S>))
        .route("/event/{cdbid}", put(routes::events::update::<S>))
        .route(
            "/event/{cdbid}/keywords",
            post(routes::events::add_keywords::<S>).delete(routes::events::delete_keyword::<S>),
        )
        .route(
            "/event/{cdbid}/translations",
            post(routes::events::translate::<S>).delete(routes::events::delete_translation::<S>),
        )
        .route("/event/{cdbid}/links", post(routes::events::add_link::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over `event_store`, loading the schemas
/// named by `config`.
pub fn create_default_state<S: EventStore + 'static>(
    event_store: S,
    config: &Config,
) -> Result<Arc<AppState<S>>, RegistryError> {
    let registry = Arc::new(config.namespace_registry()?);
    let guard = DocumentGuard::new(registry);
    let repository = EventSourcedRepository::new(event_store);

    Ok(Arc::new(AppState {
        handler: EventCommandHandler::new(repository, guard),
        link_base_url: config.link_base_url.clone(),
        max_document_bytes: config.max_document_bytes,
    }))
}
