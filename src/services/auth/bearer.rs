//! `Authorization: Bearer <token>` の取り出し
use axum::http::{HeaderMap, header};

use crate::services::auth::AuthError;

/// Extract the raw bearer token from request headers.
///
/// - header absent               -> `MissingHeader`
/// - not visible ASCII / empty   -> `MalformedHeader`
/// - scheme other than `Bearer`  -> `WrongScheme` (scheme match is case-insensitive)
/// - `Bearer` alone              -> `MissingToken`
/// - more than two parts         -> `MalformedHeader`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::WrongScheme);
    }

    let token = parts.next().ok_or(AuthError::MissingToken)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        map
    }

    #[test]
    fn extracts_token() {
        let map = headers("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&map).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let map = headers("bearer abc");
        assert_eq!(bearer_token(&map).unwrap(), "abc");
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingHeader)
        ));
    }

    #[test]
    fn wrong_scheme() {
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthError::WrongScheme)
        ));
    }

    #[test]
    fn scheme_without_token() {
        assert!(matches!(
            bearer_token(&headers("Bearer")),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn too_many_parts_or_blank() {
        assert!(matches!(
            bearer_token(&headers("Bearer a b")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            bearer_token(&headers("   ")),
            Err(AuthError::MalformedHeader)
        ));
    }
}
