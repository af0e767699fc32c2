use audit_engine::{AuditError, AuditStats, BatchRequest, BatchSummary, DEFAULT_STATUS_SAMPLE};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::server::app::AppState;

/// Largest status sample a caller may ask for
const MAX_STATUS_SAMPLE: usize = 200;

/// Error response for the audit routes: `{ "error": "..." }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        let status = match &err {
            AuditError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AuditError::SubjectsUnavailable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, "Audit request failed");
        } else {
            warn!(error = %err, "Audit request rejected");
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Run one page of audits
///
/// Partial failures come back as data in the summary; only a bad request or
/// an unreadable subject list is an error response.
pub async fn run_batch_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchSummary>, ApiError> {
    let summary = state.deps.orchestrator.run(&request).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    sample: Option<usize>,
}

/// Totals plus a sample of the most recent audits
pub async fn audit_status_handler(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<AuditStats>, ApiError> {
    let sample = params
        .sample
        .unwrap_or(DEFAULT_STATUS_SAMPLE)
        .min(MAX_STATUS_SAMPLE);
    let stats = state.deps.orchestrator.status(sample).await?;
    Ok(Json(stats))
}
