use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::server::app::AppState;

/// The shared secret guarding audit routes, kept only as a digest.
#[derive(Clone)]
pub struct BearerSecret {
    digest: Option<[u8; 32]>,
}

impl BearerSecret {
    /// `None` (or a blank secret) means every request is refused.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            digest: secret
                .filter(|s| !s.trim().is_empty())
                .map(|s| digest(&s)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// Compare a presented token against the secret.
    ///
    /// Both sides are hashed first so the comparison runs over fixed-length
    /// digests, not the raw secret.
    pub fn matches(&self, token: &str) -> bool {
        match &self.digest {
            Some(expected) => {
                let presented = digest(token);
                expected
                    .iter()
                    .zip(presented.iter())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
            }
            None => false,
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Bearer token middleware
///
/// Runs before any handler so a bad credential never reaches a provider.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.secret.is_configured() {
        error!("AUDIT_SECRET is not configured; refusing audit request");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Audit secret not configured" })),
        )
            .into_response();
    }

    let authorized = extract_bearer(&request).is_some_and(|token| state.secret.matches(token));
    if !authorized {
        debug!("Rejected audit request with missing or invalid bearer token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    }

    next.run(request).await
}

/// Token from `Authorization: Bearer <token>`
fn extract_bearer(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
