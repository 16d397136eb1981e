//! Secret store integration
//!
//! [`VaultClient`] performs the raw store reads; [`KeyCache`] owns the
//! trusted-key snapshot and its freshness window.

mod client;
mod key_cache;

pub use client::{PublicKeyMaterial, SecretStore, VaultClient};
pub use key_cache::{KeyCache, TrustedKey};
