//! Token verification
//!
//! [`decode_verification_key`] turns the store's PEM material into an
//! Ed25519 key; [`TokenVerifier`] runs the full check sequence on a bearer
//! token and yields [`Claims`] only when every check passed.

mod claims;
mod paseto;
mod verifier;

pub use claims::Claims;
pub use paseto::TOKEN_HEADER;
pub use verifier::{TokenVerifier, decode_verification_key};
