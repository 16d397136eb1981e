//! PASETO Authentication Gate
//!
//! Authenticates inbound API requests by verifying a PASETO v4.public
//! bearer token against an Ed25519 public key fetched from a Vault-style
//! secret store, then authorizes the caller by role.
//!
//! # Pipeline
//!
//! - [`vault`]: secret store client and the trusted-key cache
//! - [`token`]: PEM key decoding and token/claims verification
//! - [`authz`]: role allow-set check
//! - [`gate`]: per-request orchestration, axum middleware and the
//!   forward-auth sidecar
//!
//! The store client and key cache are constructed once at startup and
//! shared by reference into every request worker; the cache is the only
//! mutable shared state in the crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authz;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod token;
pub mod vault;

pub use error::{AuthError, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
