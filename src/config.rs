//! Configuration management

use std::{env, path::Path};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{AuthError, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    pub env_files: Vec<String>,
    /// Server configuration
    pub server: ServerConfig,
    /// Secret store (Vault) configuration
    pub vault: VaultConfig,
    /// Authentication gate configuration
    pub auth: AuthConfig,
}

/// Server configuration for the forward-auth sidecar
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8089,
        }
    }
}

/// Secret store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault server address
    pub address: String,

    /// Vault authentication token.
    /// Supports a literal value or `env:VAR_NAME` indirection.
    pub token: String,

    /// KV v2 path of the versioned public key, relative to `/v1/secret/data/`
    pub secret_path: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: "http://vault:8200".to_string(),
            token: String::new(),
            secret_path: "lms/paseto/keys/public".to_string(),
        }
    }
}

impl VaultConfig {
    /// Resolve the store token, expanding `env:VAR_NAME` indirection.
    #[must_use]
    pub fn resolve_token(&self) -> String {
        self.token.strip_prefix("env:").map_or_else(
            || self.token.clone(),
            |var| env::var(var).unwrap_or_default(),
        )
    }
}

/// Authentication gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Roles admitted by the gate. Empty means no role restriction.
    pub required_roles: Vec<String>,

    /// Seconds a fetched public key is served from cache before a refresh
    pub cache_timeout_secs: u64,

    /// Path prefixes exempt from authentication
    pub skip_path_prefixes: Vec<String>,

    /// Prefix for the identity headers injected on admitted requests
    pub header_prefix: String,

    /// Expected `iss` claim
    pub issuer: String,

    /// Expected `aud` claim
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required_roles: Vec::new(),
            cache_timeout_secs: 3600,
            skip_path_prefixes: vec![
                "/health".to_string(),
                "/metrics".to_string(),
                "/auth/login".to_string(),
                "/auth/refresh".to_string(),
            ],
            header_prefix: "X-User-".to_string(),
            issuer: "lms-auth-service".to_string(),
            audience: "lms-platform".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(AuthError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (PASETO_GATE_ prefix)
        figment = figment.merge(Env::prefixed("PASETO_GATE_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        // Load env files into the process environment before `env:VAR`
        // indirection is resolved.
        config.load_env_files();

        Ok(config)
    }

    /// Fail fast on settings the gate cannot run without.
    ///
    /// A missing store address or token would otherwise only surface on the
    /// first key fetch; authentication must never be silently bypassed.
    pub fn validate(&self) -> Result<()> {
        if self.vault.address.is_empty() {
            return Err(AuthError::Config("vault address not configured".to_string()));
        }
        if self.vault.resolve_token().is_empty() {
            return Err(AuthError::Config("vault token not configured".to_string()));
        }
        Ok(())
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }
}
