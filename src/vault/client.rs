//! Secret store client
//!
//! Single-purpose Vault KV v2 reader: one versioned public key plus a
//! liveness probe. No retries, no backoff; a failed attempt surfaces
//! immediately and retry policy stays with the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{AuthError, Result};

/// Fixed request timeout for all store calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw key material and metadata as stored in the secret store.
///
/// Only `pem` is required on the wire; the remaining fields default to
/// empty strings when the store omits them.
#[derive(Debug, Clone)]
pub struct PublicKeyMaterial {
    /// PEM-encoded public key
    pub pem: String,
    /// Opaque key version identifier
    pub key_id: String,
    /// Creation timestamp as recorded by the issuer
    pub created_at: String,
    /// Declared signature algorithm
    pub algorithm: String,
    /// Declared key type
    pub key_type: String,
}

/// Read access to the remote secret store.
///
/// The seam between [`super::KeyCache`] and the network: production uses
/// [`VaultClient`], tests substitute an in-memory store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the current PEM-encoded public key and its metadata
    async fn fetch_public_key(&self) -> Result<PublicKeyMaterial>;

    /// Probe store liveness; success is HTTP 200 on the health endpoint
    async fn health_check(&self) -> Result<()>;
}

/// HTTP client for a Vault-style secret store
pub struct VaultClient {
    base_url: String,
    token: String,
    secret_path: String,
    http: reqwest::Client,
}

impl VaultClient {
    /// Create a client for the store at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be constructed.
    pub fn new(address: &str, token: String, secret_path: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: address.trim_end_matches('/').to_string(),
            token,
            secret_path: secret_path.trim_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn fetch_public_key(&self) -> Result<PublicKeyMaterial> {
        let url = format!("{}/v1/secret/data/{}", self.base_url, self.secret_path);
        debug!(url = %url, "Fetching public key from secret store");

        let response = self
            .http
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::StoreBadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        parse_secret_envelope(&body)
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1/sys/health", self.base_url);

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::StoreBadStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Extract the key material from a KV v2 read response.
///
/// The payload lives at `data.data`; `key` is required, everything else
/// defaults to an empty string.
fn parse_secret_envelope(body: &[u8]) -> Result<PublicKeyMaterial> {
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|e| AuthError::StoreMalformedResponse(format!("undecodable response: {e}")))?;

    let data = envelope
        .pointer("/data/data")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            AuthError::StoreMalformedResponse("missing data.data envelope".to_string())
        })?;

    let pem = data
        .get("key")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AuthError::StoreMalformedResponse("public key not found in store response".to_string())
        })?
        .to_string();

    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(PublicKeyMaterial {
        pem,
        key_id: field("keyId"),
        created_at: field("createdAt"),
        algorithm: field("algorithm"),
        key_type: field("type"),
    })
}
