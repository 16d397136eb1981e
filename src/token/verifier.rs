//! Token verifier
//!
//! Decodes the PEM-wrapped verification key and runs the full check
//! sequence on a bearer token: structure, signature, claims shape, expiry,
//! issuer, audience. A [`Claims`] value leaves this module only when every
//! check has passed.

use chrono::Utc;
use ed25519_dalek::{PUBLIC_KEY_LENGTH, VerifyingKey};
use pkcs8::{Document, ObjectIdentifier, SubjectPublicKeyInfoRef};

use super::claims::Claims;
use super::paseto;
use crate::{AuthError, Result};

/// SPKI algorithm identifier for Ed25519 (RFC 8410)
const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// Decode a PEM `PUBLIC KEY` block into an Ed25519 verification key.
///
/// A block that does not parse, carries another label, or holds malformed
/// key bytes is a format error; a well-formed key of another algorithm
/// family is an algorithm mismatch.
pub fn decode_verification_key(pem: &str) -> Result<VerifyingKey> {
    let (label, document) = Document::from_pem(pem)
        .map_err(|e| AuthError::KeyFormatInvalid(format!("failed to parse PEM block: {e}")))?;

    if label != "PUBLIC KEY" {
        return Err(AuthError::KeyFormatInvalid(format!(
            "unexpected PEM label: {label}"
        )));
    }

    let spki = SubjectPublicKeyInfoRef::try_from(document.as_bytes())
        .map_err(|e| AuthError::KeyFormatInvalid(format!("failed to parse public key: {e}")))?;

    if spki.algorithm.oid != ED25519_OID {
        return Err(AuthError::KeyAlgorithmMismatch(format!(
            "not an Ed25519 public key: {}",
            spki.algorithm.oid
        )));
    }

    let raw = spki.subject_public_key.as_bytes().ok_or_else(|| {
        AuthError::KeyFormatInvalid("public key bit string has unused bits".to_string())
    })?;
    let bytes: &[u8; PUBLIC_KEY_LENGTH] = raw.try_into().map_err(|_| {
        AuthError::KeyFormatInvalid(format!(
            "expected {PUBLIC_KEY_LENGTH}-byte key, got {}",
            raw.len()
        ))
    })?;

    VerifyingKey::from_bytes(bytes)
        .map_err(|e| AuthError::KeyFormatInvalid(format!("invalid key material: {e}")))
}

/// Verifies bearer tokens against a trusted key and the configured
/// issuer/audience pair.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    issuer: String,
    audience: String,
}

impl TokenVerifier {
    /// Create a verifier expecting the given `iss` and `aud` claims.
    #[must_use]
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Verify `token` and extract its claims.
    ///
    /// Checks run in order: structure and signature, claims shape, expiry
    /// (strict greater-than: a token expiring exactly now is still valid,
    /// no clock-skew tolerance), then issuer and audience equality.
    pub fn verify(&self, token: &str, key: &VerifyingKey) -> Result<Claims> {
        self.verify_at(token, key, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, key: &VerifyingKey, now: i64) -> Result<Claims> {
        let payload = paseto::verify_v4_public(token, key)?;

        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|e| AuthError::ClaimsMalformed(e.to_string()))?;

        if now > claims.exp {
            return Err(AuthError::TokenExpired {
                expired_at: claims.exp,
                now,
            });
        }

        if claims.iss != self.issuer {
            return Err(AuthError::IssuerMismatch {
                expected: self.issuer.clone(),
                actual: claims.iss,
            });
        }

        if claims.aud != self.audience {
            return Err(AuthError::AudienceMismatch {
                expected: self.audience.clone(),
                actual: claims.aud,
            });
        }

        Ok(claims)
    }
}
