//! Authentication / authorization failures.
//!
//! Each variant carries a stable `reason` code and a fixed client-facing description.
//! Internal detail (jsonwebtoken errors, fetch errors) is only shown via `Display` for logs.
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingHeader,
    #[error("authorization header is malformed")]
    MalformedHeader,
    #[error("authorization scheme is not bearer")]
    WrongScheme,
    #[error("bearer token is missing")]
    MissingToken,

    #[error("token header has no key id")]
    MissingKeyId,
    #[error("no signing key matches kid '{0}'")]
    UnknownKey(String),
    #[error("signing key set unavailable: {0}")]
    KeySetUnavailable(String),

    #[error("token expired")]
    TokenExpired,
    #[error("incorrect claims: {0}")]
    IncorrectClaims(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("permissions claim is missing")]
    PermissionsMissing,
    #[error("permission '{0}' not granted")]
    PermissionDenied(&'static str),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PermissionsMissing | Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::KeySetUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingHeader => "authorization_header_missing",
            Self::MalformedHeader
            | Self::WrongScheme
            | Self::MissingToken
            | Self::MissingKeyId
            | Self::UnknownKey(_) => "invalid_header",
            Self::KeySetUnavailable(_) => "key_set_unavailable",
            Self::TokenExpired => "token_expired",
            Self::IncorrectClaims(_) | Self::PermissionsMissing => "invalid_claims",
            Self::InvalidToken(_) => "invalid_token",
            Self::PermissionDenied(_) => "unauthorized",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header is expected.",
            Self::MalformedHeader => "Authorization header must be bearer token.",
            Self::WrongScheme => "Authorization header must start with \"Bearer\".",
            Self::MissingToken => "Token not found.",
            Self::MissingKeyId => "Authorization malformed.",
            Self::UnknownKey(_) => "Unable to find the appropriate key.",
            Self::KeySetUnavailable(_) => "Unable to fetch signing keys.",
            Self::TokenExpired => "Token expired.",
            Self::IncorrectClaims(_) => "Incorrect claims. Please, check the audience and issuer.",
            Self::InvalidToken(_) => "Unable to parse authentication token.",
            Self::PermissionsMissing => "Permissions not included in JWT.",
            Self::PermissionDenied(_) => "Permission not found.",
        }
    }
}
