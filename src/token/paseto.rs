//! PASETO v4.public parsing and signature verification
//!
//! Only the public-verification half of the scheme: split the token,
//! rebuild the pre-authentication encoding and check the Ed25519
//! signature. Claim semantics live in [`super::verifier`].

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ed25519_dalek::{SIGNATURE_LENGTH, Signature, Verifier as _, VerifyingKey};

use crate::{AuthError, Result};

/// Header every token of the supported scheme starts with
pub const TOKEN_HEADER: &str = "v4.public.";

/// Verify `token` against `key` and return the raw claims JSON.
///
/// Structural failures (wrong header, bad base64, truncated payload) and
/// signature mismatches are distinct error kinds: the former indicates a
/// client bug, the latter a forgery or key mismatch.
pub fn verify_v4_public(token: &str, key: &VerifyingKey) -> Result<Vec<u8>> {
    let rest = token.strip_prefix(TOKEN_HEADER).ok_or_else(|| {
        AuthError::TokenMalformed(format!("token does not start with {TOKEN_HEADER}"))
    })?;

    let (body_b64, footer_b64) = match rest.split_once('.') {
        Some((body, footer)) => (body, footer),
        None => (rest, ""),
    };

    let body = URL_SAFE_NO_PAD
        .decode(body_b64)
        .map_err(|e| AuthError::TokenMalformed(format!("payload is not base64url: {e}")))?;
    if body.len() < SIGNATURE_LENGTH {
        return Err(AuthError::TokenMalformed(
            "payload shorter than a signature".to_string(),
        ));
    }
    let footer = URL_SAFE_NO_PAD
        .decode(footer_b64)
        .map_err(|e| AuthError::TokenMalformed(format!("footer is not base64url: {e}")))?;

    let (message, sig_bytes) = body.split_at(body.len() - SIGNATURE_LENGTH);
    let mut sig = [0u8; SIGNATURE_LENGTH];
    sig.copy_from_slice(sig_bytes);
    let signature = Signature::from_bytes(&sig);

    // The signature covers header, message and footer (empty implicit
    // assertion), so a tampered footer also fails verification.
    let m2 = pre_auth_encode(&[TOKEN_HEADER.as_bytes(), message, &footer, b""]);
    key.verify(&m2, &signature)
        .map_err(|_| AuthError::TokenSignatureInvalid)?;

    Ok(message.to_vec())
}

/// Pre-authentication encoding: LE64 piece count, then each piece
/// length-prefixed. Makes the signed input unambiguous.
fn pre_auth_encode(pieces: &[&[u8]]) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(8 + pieces.iter().map(|p| 8 + p.len()).sum::<usize>());
    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }
    out
}

/// Little-endian u64 with the most significant bit cleared
fn le64(n: u64) -> [u8; 8] {
    (n & (u64::MAX >> 1)).to_le_bytes()
}
