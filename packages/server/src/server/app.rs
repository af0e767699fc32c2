//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::{bearer_auth_middleware, BearerSecret};
use crate::server::routes::{audit_status_handler, health_handler, run_batch_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub secret: BearerSecret,
}

impl AppState {
    pub fn new(deps: ServerDeps, audit_secret: Option<String>) -> Self {
        Self {
            deps: Arc::new(deps),
            secret: BearerSecret::new(audit_secret),
        }
    }
}

/// Build the Axum application router
///
/// `/api/audits/*` sits behind the bearer check; `/health` is public.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let audits = Router::new()
        .route("/batch", post(run_batch_handler))
        .route("/status", get(audit_status_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_middleware,
        ));

    Router::new()
        .nest("/api/audits", audits)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
