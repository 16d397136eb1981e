//! Axum adapter for embedding the gate in a host router

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use super::{AuthGate, Decision};
use crate::AuthError;

/// Authentication middleware.
///
/// On admission the identity headers are written onto the forwarded
/// request and the verified [`crate::token::Claims`] are inserted as a
/// request extension for downstream handlers.
pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let authorization = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match gate.check(&path, authorization.as_deref()).await {
        Ok(Decision::Skipped) => next.run(request).await,
        Ok(Decision::Admitted(admission)) => {
            apply_headers(request.headers_mut(), &admission.headers);
            request.extensions_mut().insert(admission.claims);
            next.run(request).await
        }
        Err(e) => rejection_response(&path, &e),
    }
}

/// Copy identity headers onto an HTTP header map, skipping values the
/// wire format cannot carry.
pub(crate) fn apply_headers(target: &mut axum::http::HeaderMap, headers: &[(String, String)]) {
    for (name, value) in headers {
        match (name.parse::<HeaderName>(), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                target.insert(name, value);
            }
            _ => {
                warn!(header = %name, "Dropping identity header with unencodable value");
            }
        }
    }
}

/// Map a gate error onto the caller-visible response.
///
/// The detailed error is logged here; the response body only carries the
/// coarse message and code from [`AuthError`].
pub(crate) fn rejection_response(path: &str, error: &AuthError) -> Response {
    warn!(path = %path, error = %error, "Request rejected");

    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::UNAUTHORIZED);
    let mut response = (
        status,
        Json(json!({
            "message": error.public_message(),
            "error": error.public_code(),
        })),
    )
        .into_response();

    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert("WWW-Authenticate", HeaderValue::from_static("Bearer"));
    }
    response
}
