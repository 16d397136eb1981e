//! Request authentication gate
//!
//! Linear orchestration over the pipeline: skip check, bearer extraction,
//! key cache, token verification, role authorization, identity header
//! emission. The first failure short-circuits; no step is retried or
//! re-entered. The gate itself is HTTP-agnostic (it sees only a path and
//! an `Authorization` header value), so hosts other than the bundled axum
//! adapter can embed it.

mod headers;
mod middleware;
mod server;

pub use middleware::auth_middleware;
pub use server::GateServer;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::authz;
use crate::config::AuthConfig;
use crate::token::{Claims, TokenVerifier};
use crate::vault::KeyCache;
use crate::{AuthError, Result};

/// Outcome of gating one request
#[derive(Debug)]
pub enum Decision {
    /// The path is exempt from authentication
    Skipped,
    /// The request is authenticated and authorized
    Admitted(Admission),
}

/// Verified identity attached to an admitted request
#[derive(Debug, Clone)]
pub struct Admission {
    /// Verified claims
    pub claims: Claims,
    /// Identity headers for the downstream service
    pub headers: Vec<(String, String)>,
}

/// Authentication gate shared by all request workers
pub struct AuthGate {
    cache: Arc<KeyCache>,
    verifier: TokenVerifier,
    required_roles: Vec<String>,
    skip_path_prefixes: Vec<String>,
    header_prefix: String,
}

impl AuthGate {
    /// Build a gate over a shared key cache.
    #[must_use]
    pub fn new(cache: Arc<KeyCache>, config: &AuthConfig) -> Self {
        Self {
            cache,
            verifier: TokenVerifier::new(&config.issuer, &config.audience),
            required_roles: config.required_roles.clone(),
            skip_path_prefixes: config.skip_path_prefixes.clone(),
            header_prefix: config.header_prefix.clone(),
        }
    }

    /// Key id of the currently trusted key, for observability.
    #[must_use]
    pub fn key_id(&self) -> Option<String> {
        self.cache.key_id()
    }

    /// Gate one request given its path and `Authorization` header value.
    ///
    /// Client errors (missing or malformed credentials) are detected
    /// before any store traffic happens.
    pub async fn check(&self, path: &str, authorization: Option<&str>) -> Result<Decision> {
        if self.should_skip(path) {
            debug!(path = %path, "Skipping authentication for exempt path");
            return Ok(Decision::Skipped);
        }

        let token = extract_bearer(authorization)?;
        let key = self.cache.get().await?;
        let claims = self.verifier.verify(token, &key.verifying_key)?;
        authz::authorize(&claims, &self.required_roles)?;

        let headers = headers::identity_headers(
            &self.header_prefix,
            &claims,
            &key.key_id,
            Utc::now().timestamp(),
        );

        info!(
            user = %claims.user_id,
            role = %claims.role,
            org = %claims.organization_id,
            "Authentication successful"
        );
        Ok(Decision::Admitted(Admission { claims, headers }))
    }

    fn should_skip(&self, path: &str) -> bool {
        self.skip_path_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }
}

/// Pull the bearer token out of an `Authorization` header value.
fn extract_bearer(authorization: Option<&str>) -> Result<&str> {
    let header = authorization.ok_or(AuthError::MissingAuthorization)?;
    if header.is_empty() {
        return Err(AuthError::MissingAuthorization);
    }

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthorizationScheme)?;
    if token.is_empty() {
        return Err(AuthError::EmptyBearerToken);
    }

    Ok(token)
}
