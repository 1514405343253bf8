use std::collections::BTreeSet;

use serde::Deserialize;

use crate::services::auth::AuthError;

/// Verified access-token claims.
///
/// NOTE:
/// - `aud` can be either a string or an array; `Validation::set_audience` checks it,
///   so it is kept as a raw `Value` here.
/// - `permissions` is the RBAC claim issued by the identity provider. `None` means the
///   claim is absent altogether, which is reported differently from an empty set.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    #[serde(default)]
    pub aud: serde_json::Value,
    pub exp: u64,

    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub permissions: Option<BTreeSet<String>>,
}

impl Claims {
    pub fn require_permission(&self, permission: &'static str) -> Result<(), AuthError> {
        let granted = self
            .permissions
            .as_ref()
            .ok_or(AuthError::PermissionsMissing)?;

        if granted.contains(permission) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied(permission))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(extra: serde_json::Value) -> Claims {
        let mut base = json!({
            "iss": "https://tenant.example.com/",
            "sub": "auth0|barista",
            "aud": ["drinks", "https://tenant.example.com/userinfo"],
            "exp": 4_102_444_800u64,
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn granted_permission_passes() {
        let c = claims(json!({ "permissions": ["get:drinks-detail", "post:drinks"] }));
        assert!(c.require_permission("post:drinks").is_ok());
        assert!(c.require_permission("get:drinks-detail").is_ok());
    }

    #[test]
    fn absent_claim_is_distinct_from_missing_permission() {
        let no_claim = claims(json!({}));
        assert!(matches!(
            no_claim.require_permission("post:drinks"),
            Err(AuthError::PermissionsMissing)
        ));

        let empty = claims(json!({ "permissions": [] }));
        assert!(matches!(
            empty.require_permission("post:drinks"),
            Err(AuthError::PermissionDenied("post:drinks"))
        ));
    }

    #[test]
    fn permission_match_is_exact() {
        let c = claims(json!({ "permissions": ["patch:drinks"] }));
        assert!(matches!(
            c.require_permission("patch:drinks-detail"),
            Err(AuthError::PermissionDenied(_))
        ));
    }
}
