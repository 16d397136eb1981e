//! Error types for the authentication gate
//!
//! Every component returns a typed [`AuthError`] rather than panicking. The
//! gate maps each variant onto a caller-visible HTTP status and a coarse
//! message; the detailed kind is only ever logged, so callers cannot tell a
//! signature failure from an expired token.

use thiserror::Error;

/// Result type alias for the authentication gate
pub type Result<T> = std::result::Result<T, AuthError>;

/// Authentication gate errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Configuration error (missing store address/token, invalid listen address)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The secret store could not be reached (transport-level failure)
    #[error("Secret store unreachable: {0}")]
    StoreUnreachable(#[from] reqwest::Error),

    /// The secret store answered with a non-success status
    #[error("Secret store returned status {status}: {body}")]
    StoreBadStatus {
        /// HTTP status code returned by the store
        status: u16,
        /// Response body, kept for diagnostics
        body: String,
    },

    /// The secret store response could not be decoded or lacks the key field
    #[error("Malformed secret store response: {0}")]
    StoreMalformedResponse(String),

    /// The stored PEM block could not be decoded or is not a public key
    #[error("Invalid public key format: {0}")]
    KeyFormatInvalid(String),

    /// The stored key is not of the expected signature family
    #[error("Public key algorithm mismatch: {0}")]
    KeyAlgorithmMismatch(String),

    /// No `Authorization` header on the request
    #[error("No authorization header found")]
    MissingAuthorization,

    /// The `Authorization` header does not carry a `Bearer` credential
    #[error("Invalid authorization header format")]
    InvalidAuthorizationScheme,

    /// The `Authorization` header carries an empty token
    #[error("Empty bearer token")]
    EmptyBearerToken,

    /// The token does not parse under the v4.public structure
    #[error("Token parsing failed: {0}")]
    TokenMalformed(String),

    /// The token signature does not verify against the trusted key
    #[error("Token signature verification failed")]
    TokenSignatureInvalid,

    /// The verified payload is missing required claims or has wrong types
    #[error("Failed to decode claims: {0}")]
    ClaimsMalformed(String),

    /// The token expiry lies in the past
    #[error("Token expired at {expired_at} (now {now})")]
    TokenExpired {
        /// Unix timestamp the token expired at
        expired_at: i64,
        /// Unix timestamp at verification
        now: i64,
    },

    /// The `iss` claim does not match the configured issuer
    #[error("Token issuer mismatch: expected {expected}, got {actual}")]
    IssuerMismatch {
        /// Configured expected issuer
        expected: String,
        /// Issuer found in the token
        actual: String,
    },

    /// The `aud` claim does not match the configured audience
    #[error("Token audience mismatch: expected {expected}, got {actual}")]
    AudienceMismatch {
        /// Configured expected audience
        expected: String,
        /// Audience found in the token
        actual: String,
    },

    /// The verified role is not in the configured allow-set
    #[error("Role '{role}' not in required roles {required:?}")]
    RoleNotPermitted {
        /// Role carried by the token
        role: String,
        /// Roles the gate is configured to admit
        required: Vec<String>,
    },
}

impl AuthError {
    /// HTTP status this error maps to at the gate boundary.
    ///
    /// Infrastructure failures (store unreachable, bad key material) are
    /// 503 rather than 401 so operators can separate an unhealthy key
    /// pipeline from genuinely bad credentials.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Config(_)
            | Self::StoreUnreachable(_)
            | Self::StoreBadStatus { .. }
            | Self::StoreMalformedResponse(_)
            | Self::KeyFormatInvalid(_)
            | Self::KeyAlgorithmMismatch(_) => 503,
            Self::MissingAuthorization
            | Self::InvalidAuthorizationScheme
            | Self::EmptyBearerToken
            | Self::TokenMalformed(_)
            | Self::TokenSignatureInvalid
            | Self::ClaimsMalformed(_)
            | Self::TokenExpired { .. }
            | Self::IssuerMismatch { .. }
            | Self::AudienceMismatch { .. } => 401,
            Self::RoleNotPermitted { .. } => 403,
        }
    }

    /// Coarse message disclosed to the caller.
    ///
    /// Verification failures all collapse to the same message so the
    /// response cannot be used as an oracle for why a token was rejected.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Config(_)
            | Self::StoreUnreachable(_)
            | Self::StoreBadStatus { .. }
            | Self::StoreMalformedResponse(_)
            | Self::KeyFormatInvalid(_)
            | Self::KeyAlgorithmMismatch(_) => "Authentication service unavailable",
            Self::MissingAuthorization
            | Self::InvalidAuthorizationScheme
            | Self::EmptyBearerToken => "Authentication required",
            Self::TokenMalformed(_)
            | Self::TokenSignatureInvalid
            | Self::ClaimsMalformed(_)
            | Self::TokenExpired { .. }
            | Self::IssuerMismatch { .. }
            | Self::AudienceMismatch { .. } => "Invalid or expired authentication token",
            Self::RoleNotPermitted { .. } => "Insufficient permissions for this resource",
        }
    }

    /// Stable machine-readable code for the response body.
    #[must_use]
    pub fn public_code(&self) -> &'static str {
        match self.http_status() {
            503 => "authentication_service_unavailable",
            403 => "insufficient_permissions",
            _ => match self {
                Self::MissingAuthorization
                | Self::InvalidAuthorizationScheme
                | Self::EmptyBearerToken => "missing_or_invalid_token",
                _ => "token_verification_failed",
            },
        }
    }
}
