//! Role authorization

use crate::token::Claims;
use crate::{AuthError, Result};

/// Check the verified role against the configured allow-set.
///
/// An empty `required_roles` means no restriction is configured.
/// Comparison is case-insensitive, OR-combined across the set.
pub fn authorize(claims: &Claims, required_roles: &[String]) -> Result<()> {
    if required_roles.is_empty() {
        return Ok(());
    }

    if required_roles
        .iter()
        .any(|required| required.eq_ignore_ascii_case(&claims.role))
    {
        return Ok(());
    }

    Err(AuthError::RoleNotPermitted {
        role: claims.role.clone(),
        required: required_roles.to_vec(),
    })
}
