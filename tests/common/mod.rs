//! Shared fixtures for integration tests: deterministic signing keys, a
//! token signer (the crate itself never issues tokens) and an in-process
//! fake Vault.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ed25519_dalek::pkcs8::EncodePublicKey;
use ed25519_dalek::{Signer as _, SigningKey};
use parking_lot::RwLock;
use serde_json::{Value, json};

pub const ISSUER: &str = "lms-auth-service";
pub const AUDIENCE: &str = "lms-platform";
pub const VAULT_TOKEN: &str = "s.test-token";

/// Deterministic signing key; different seeds give unrelated keys.
pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

/// PEM-encode the verification half of `key` the way the store serves it.
pub fn public_key_pem(key: &SigningKey) -> String {
    key.verifying_key()
        .to_public_key_pem(pkcs8::LineEnding::LF)
        .unwrap()
}

/// Claims payload with the platform's expected issuer/audience.
pub fn claims(role: &str, exp: i64) -> Value {
    json!({
        "userId": "user-42",
        "email": "jo@example.edu",
        "role": role,
        "organizationId": "org-7",
        "permissions": ["courses:read", "courses:write"],
        "sessionId": "sess-9",
        "iat": exp - 3600,
        "exp": exp,
        "iss": ISSUER,
        "aud": AUDIENCE,
    })
}

/// Sign `payload` into a v4.public token.
pub fn sign_token(payload: &Value, key: &SigningKey) -> String {
    const HEADER: &[u8] = b"v4.public.";

    let message = serde_json::to_vec(payload).unwrap();

    // Pre-authentication encoding over [header, message, footer, implicit]
    let pieces: [&[u8]; 4] = [HEADER, &message, b"", b""];
    let mut m2 = Vec::new();
    m2.extend_from_slice(&(pieces.len() as u64).to_le_bytes());
    for piece in pieces {
        m2.extend_from_slice(&(piece.len() as u64).to_le_bytes());
        m2.extend_from_slice(piece);
    }
    let signature = key.sign(&m2);

    let mut body = message;
    body.extend_from_slice(&signature.to_bytes());
    format!("v4.public.{}", URL_SAFE_NO_PAD.encode(&body))
}

/// Mutable behavior knobs of the fake Vault.
pub struct VaultState {
    pub pem: RwLock<String>,
    pub key_id: RwLock<String>,
    pub healthy: AtomicBool,
    pub serving: AtomicBool,
    pub omit_key_field: AtomicBool,
    pub fetches: AtomicUsize,
}

/// In-process fake Vault speaking just enough of the KV v2 API.
pub struct FakeVault {
    pub address: String,
    pub state: Arc<VaultState>,
}

impl FakeVault {
    /// Serve `pem` as the stored public key on an ephemeral port.
    pub async fn spawn(pem: String) -> Self {
        let state = Arc::new(VaultState {
            pem: RwLock::new(pem),
            key_id: RwLock::new("key-2024-07".to_string()),
            healthy: AtomicBool::new(true),
            serving: AtomicBool::new(true),
            omit_key_field: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/v1/sys/health", get(health))
            .route("/v1/secret/data/{*path}", get(read_secret))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { address, state }
    }

    /// Swap the stored key, as a rotation by the issuing service would.
    pub fn rotate(&self, pem: String, key_id: &str) {
        *self.state.pem.write() = pem;
        *self.state.key_id.write() = key_id.to_string();
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }
}

async fn health(State(state): State<Arc<VaultState>>) -> Response {
    if state.healthy.load(Ordering::SeqCst) {
        (StatusCode::OK, Json(json!({"initialized": true, "sealed": false}))).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"sealed": true}))).into_response()
    }
}

async fn read_secret(State(state): State<Arc<VaultState>>, headers: HeaderMap) -> Response {
    state.fetches.fetch_add(1, Ordering::SeqCst);

    if headers
        .get("X-Vault-Token")
        .and_then(|v| v.to_str().ok())
        != Some(VAULT_TOKEN)
    {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"errors": ["permission denied"]})),
        )
            .into_response();
    }

    if !state.serving.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"errors": ["internal error"]})),
        )
            .into_response();
    }

    let mut data = json!({
        "keyId": state.key_id.read().clone(),
        "createdAt": "2024-07-01T00:00:00Z",
        "algorithm": "EdDSA",
        "type": "public",
    });
    if !state.omit_key_field.load(Ordering::SeqCst) {
        data["key"] = json!(state.pem.read().clone());
    }

    Json(json!({
        "request_id": "f1f9a41c",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": { "data": data, "metadata": { "version": 3 } },
    }))
    .into_response()
}
