use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    providers_configured: Vec<String>,
}

/// Health check endpoint
///
/// Always 200 while the process is up; `providers_configured` lists the
/// providers that have credentials, so a deploy missing keys is visible.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        providers_configured: state.deps.providers_configured.clone(),
    })
}
