//! Forward-auth sidecar server
//!
//! Every request is gated and answered directly: 204 with identity
//! headers on admission (the fronting proxy copies them onto the upstream
//! request), or the mapped rejection. `/gate/health` reports sidecar and
//! store health.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::middleware::{apply_headers, rejection_response};
use super::{AuthGate, Decision};
use crate::config::Config;
use crate::vault::{KeyCache, SecretStore, VaultClient};
use crate::{AuthError, Result};

/// Shared state behind the sidecar routes
struct GateState {
    gate: Arc<AuthGate>,
    store: Arc<dyn SecretStore>,
}

/// Forward-auth sidecar
pub struct GateServer {
    config: Config,
    state: Arc<GateState>,
}

impl GateServer {
    /// Wire up the pipeline from configuration: one store client and one
    /// key cache, shared by every request worker.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn SecretStore> = Arc::new(VaultClient::new(
            &config.vault.address,
            config.vault.resolve_token(),
            &config.vault.secret_path,
        )?);
        let cache = Arc::new(KeyCache::new(
            Arc::clone(&store),
            Duration::from_secs(config.auth.cache_timeout_secs),
        ));
        let gate = Arc::new(AuthGate::new(cache, &config.auth));

        Ok(Self {
            config,
            state: Arc::new(GateState { gate, store }),
        })
    }

    /// Build the sidecar router.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/gate/health", get(health))
            .fallback(forward_auth)
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.state))
    }

    /// Run the sidecar until SIGINT/SIGTERM.
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| AuthError::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let app = self.router();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AuthError::Config(format!("Failed to bind {addr}: {e}")))?;

        info!(
            host = %self.config.server.host,
            port = self.config.server.port,
            store = %self.config.vault.address,
            roles = ?self.config.auth.required_roles,
            "Authentication gate listening"
        );
        if self.config.auth.required_roles.is_empty() {
            info!("No role restriction configured; any verified role is admitted");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AuthError::Config(format!("Server error: {e}")))?;

        info!("Shutdown complete");
        Ok(())
    }
}

/// Gate the forwarded request.
///
/// Proxies deliver the original request line in `X-Forwarded-Uri`; when
/// the sidecar is addressed directly, its own path is used instead.
async fn forward_auth(
    State(state): State<Arc<GateState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let path = headers
        .get("x-forwarded-uri")
        .and_then(|v| v.to_str().ok())
        .map_or_else(
            || uri.path().to_string(),
            |forwarded| {
                forwarded
                    .split('?')
                    .next()
                    .unwrap_or(forwarded)
                    .to_string()
            },
        );
    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok());

    match state.gate.check(&path, authorization).await {
        Ok(Decision::Skipped) => StatusCode::NO_CONTENT.into_response(),
        Ok(Decision::Admitted(admission)) => {
            let mut response = StatusCode::NO_CONTENT.into_response();
            apply_headers(response.headers_mut(), &admission.headers);
            response
        }
        Err(e) => rejection_response(&path, &e),
    }
}

/// Sidecar health: probes the secret store and reports the cached key id.
async fn health(State(state): State<Arc<GateState>>) -> Response {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "key_id": state.gate.key_id(),
            })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Secret store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "key_id": state.gate.key_id(),
                })),
            )
                .into_response()
        }
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
