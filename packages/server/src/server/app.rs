//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::toilets::{AggregationConfig, ToiletService};
use crate::kernel::ServerDeps;
use crate::server::routes::{all_toilets_handler, health_handler, toilets_page_handler};
use crate::server::static_files::static_service;

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub toilets: Arc<ToiletService>,
    /// Window width used when the proxy route is called without `end`.
    pub page_size: u32,
}

impl AxumAppState {
    pub fn new(deps: &ServerDeps, config: AggregationConfig) -> Self {
        Self {
            toilets: Arc::new(ToiletService::new(deps, config)),
            page_size: config.pagination.page_size,
        }
    }
}

/// Build the Axum application router
///
/// `static_dir`, when given, is served for every path no API route claims.
pub fn build_app(state: AxumAppState, static_dir: Option<&str>) -> Router {
    // CORS configuration - read-only API, any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE]);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/toilets", get(toilets_page_handler))
        .route("/api/toilets/all", get(all_toilets_handler));

    if let Some(dir) = static_dir {
        router = router.fallback_service(static_service(dir));
    }

    router
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
