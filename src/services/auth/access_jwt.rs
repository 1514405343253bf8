use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};

use crate::services::auth::{AuthError, Claims, KeySource};

/// Access-token verifier backed by the identity provider's key set.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    validation: Validation,
    keys: Arc<dyn KeySource>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    /// `algorithms` must not be empty (Config guarantees it).
    pub fn new(
        keys: Arc<dyn KeySource>,
        issuer: &str,
        audience: &str,
        algorithms: &[Algorithm],
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(algorithms.first().copied().unwrap_or_default());
        validation.algorithms = algorithms.to_vec();
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Self { validation, keys }
    }

    /// Verify a JWT access token.
    ///
    /// 1. read `kid` from the (unverified) header
    /// 2. resolve the matching public key
    /// 3. check signature, algorithm, `exp`, `iss`, `aud`
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(AuthError::InvalidToken)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let key = self.keys.decoding_key(&kid).await?;

        let data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation)
            .map_err(classify)?;

        Ok(data.claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::MissingRequiredClaim(_) => AuthError::IncorrectClaims(err),
        _ => AuthError::InvalidToken(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_classified_separately() {
        let err = jsonwebtoken::errors::Error::from(ErrorKind::ExpiredSignature);
        assert!(matches!(classify(err), AuthError::TokenExpired));
    }

    #[test]
    fn audience_and_issuer_mismatch_are_claim_errors() {
        for kind in [ErrorKind::InvalidAudience, ErrorKind::InvalidIssuer] {
            let err = jsonwebtoken::errors::Error::from(kind);
            assert!(matches!(classify(err), AuthError::IncorrectClaims(_)));
        }
    }

    #[test]
    fn signature_failure_is_invalid_token() {
        let err = jsonwebtoken::errors::Error::from(ErrorKind::InvalidSignature);
        assert!(matches!(classify(err), AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_before_key_lookup() {
        let keys = Arc::new(crate::services::auth::StaticKeySet::from_json(r#"{"keys":[]}"#).unwrap());
        let auth = AuthService::new(keys, "https://issuer/", "drinks", &[Algorithm::RS256], 0);
        assert!(matches!(
            auth.verify("not-a-jwt").await,
            Err(AuthError::InvalidToken(_))
        ));
    }
}
