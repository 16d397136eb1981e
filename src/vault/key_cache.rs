//! Trusted-key cache
//!
//! Owns the single cached verification key. Reads are served under a
//! shared lock; a refresh runs the store round-trip outside any lock and
//! installs the decoded key atomically. Freshness is re-checked after
//! acquiring the refresh guard, so concurrent stale readers share one
//! in-flight fetch instead of each hitting the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ed25519_dalek::VerifyingKey;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::client::SecretStore;
use crate::Result;
use crate::token::decode_verification_key;

/// Immutable snapshot of the trusted verification key.
///
/// A refresh installs a brand-new snapshot; an installed one is never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct TrustedKey {
    /// Decoded Ed25519 verification key
    pub verifying_key: VerifyingKey,
    /// Opaque key version identifier, carried into audit headers
    pub key_id: String,
    /// When this snapshot was fetched from the store
    pub fetched_at: Instant,
}

/// Serves the store's public key from cache for a configured freshness
/// window, refreshing through the [`SecretStore`] when stale.
pub struct KeyCache {
    store: Arc<dyn SecretStore>,
    freshness_window: Duration,
    state: RwLock<Option<TrustedKey>>,
    /// Serializes refreshes; never held while the `RwLock` is held
    refresh: Mutex<()>,
}

impl KeyCache {
    /// Create an empty cache over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>, freshness_window: Duration) -> Self {
        Self {
            store,
            freshness_window,
            state: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return the trusted key, refreshing through the store when stale.
    ///
    /// A refresh is health check, then fetch, then PEM decode, then an
    /// atomic install under the write lock. On failure the previous entry
    /// (even one past its window) is left untouched, so a later retry can
    /// still succeed and the key-id metadata survives transient store
    /// outages.
    pub async fn get(&self) -> Result<TrustedKey> {
        if let Some(key) = self.fresh() {
            return Ok(key);
        }

        let _guard = self.refresh.lock().await;

        // Re-check: a concurrent caller may have refreshed while we waited
        // on the guard.
        if let Some(key) = self.fresh() {
            debug!("Key refreshed by concurrent caller");
            return Ok(key);
        }

        self.store.health_check().await?;
        let material = self.store.fetch_public_key().await?;
        let verifying_key = decode_verification_key(&material.pem)?;

        let key = TrustedKey {
            verifying_key,
            key_id: material.key_id,
            fetched_at: Instant::now(),
        };
        *self.state.write() = Some(key.clone());

        info!(key_id = %key.key_id, "Public key cached");
        Ok(key)
    }

    /// Clear the cached key unconditionally; the next [`get`](Self::get)
    /// refetches.
    pub fn invalidate(&self) {
        *self.state.write() = None;
    }

    /// Key id of the currently cached key, `None` when nothing is cached.
    #[must_use]
    pub fn key_id(&self) -> Option<String> {
        self.state.read().as_ref().map(|k| k.key_id.clone())
    }

    fn fresh(&self) -> Option<TrustedKey> {
        self.state
            .read()
            .as_ref()
            .filter(|k| k.fetched_at.elapsed() < self.freshness_window)
            .cloned()
    }
}
