//! Identity header emission

use crate::token::Claims;

/// Build the downstream identity headers for a verified claim set.
///
/// `Permissions` is omitted entirely when the claim carries none; every
/// other header is always present.
pub fn identity_headers(
    prefix: &str,
    claims: &Claims,
    key_id: &str,
    auth_time: i64,
) -> Vec<(String, String)> {
    let mut headers = vec![
        (format!("{prefix}Id"), claims.user_id.clone()),
        (format!("{prefix}Email"), claims.email.clone()),
        (format!("{prefix}Role"), claims.role.clone()),
        (
            format!("{prefix}Organization-Id"),
            claims.organization_id.clone(),
        ),
        (format!("{prefix}Session-Id"), claims.session_id.clone()),
    ];

    if !claims.permissions.is_empty() {
        headers.push((
            format!("{prefix}Permissions"),
            claims.permissions.join(","),
        ));
    }

    headers.push((format!("{prefix}Auth-Time"), auth_time.to_string()));
    headers.push((format!("{prefix}Key-Id"), key_id.to_string()));

    headers
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn claims() -> Claims {
        Claims {
            user_id: "user-42".to_string(),
            email: "jo@example.edu".to_string(),
            role: "teacher".to_string(),
            organization_id: "org-7".to_string(),
            permissions: vec!["grades:read".to_string(), "grades:write".to_string()],
            session_id: "sess-9".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            iss: "lms-auth-service".to_string(),
            aud: "lms-platform".to_string(),
        }
    }

    fn lookup<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn emits_all_identity_headers_under_prefix() {
        let headers = identity_headers("X-User-", &claims(), "key-3", 1_700_000_100);

        assert_eq!(lookup(&headers, "X-User-Id"), Some("user-42"));
        assert_eq!(lookup(&headers, "X-User-Email"), Some("jo@example.edu"));
        assert_eq!(lookup(&headers, "X-User-Role"), Some("teacher"));
        assert_eq!(lookup(&headers, "X-User-Organization-Id"), Some("org-7"));
        assert_eq!(lookup(&headers, "X-User-Session-Id"), Some("sess-9"));
        assert_eq!(
            lookup(&headers, "X-User-Permissions"),
            Some("grades:read,grades:write")
        );
        assert_eq!(lookup(&headers, "X-User-Auth-Time"), Some("1700000100"));
        assert_eq!(lookup(&headers, "X-User-Key-Id"), Some("key-3"));
    }

    #[test]
    fn permissions_header_is_omitted_when_empty() {
        let mut no_permissions = claims();
        no_permissions.permissions.clear();

        let headers = identity_headers("X-User-", &no_permissions, "key-3", 0);
        assert_eq!(lookup(&headers, "X-User-Permissions"), None);
        // The rest is still emitted
        assert!(lookup(&headers, "X-User-Key-Id").is_some());
    }

    #[test]
    fn prefix_is_configurable() {
        let headers = identity_headers("X-Auth-", &claims(), "key-3", 0);
        assert!(lookup(&headers, "X-Auth-Id").is_some());
        assert_eq!(lookup(&headers, "X-User-Id"), None);
    }
}
