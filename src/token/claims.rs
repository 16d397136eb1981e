//! Verified token claims

use serde::{Deserialize, Serialize};

/// Decoded payload of a verified token.
///
/// Only constructed by the verifier, after the signature, expiry and
/// issuer/audience checks have all passed; immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject identifier
    pub user_id: String,
    /// Email address of the subject
    pub email: String,
    /// Role used for authorization
    pub role: String,
    /// Organization the subject belongs to
    pub organization_id: String,
    /// Granted permissions; empty when the token carries none
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Session identifier
    pub session_id: String,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expires-at, unix seconds
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}
