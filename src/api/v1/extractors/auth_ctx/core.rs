/*
 * 主な責務
 *  - Authorization header → bearer token → 署名/claims 検証 → permission 確認
 *  - 失敗は AppError::Auth (401 / 403) に変換
 * 置かないもの
 *  - 個別の permission 名 (types.rs 側)
 */
use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::auth::{Claims, bearer_token};
use crate::state::AppState;

/// A permission scope required by an endpoint, e.g. `post:drinks`.
pub trait Permission: Send + Sync + 'static {
    const SCOPE: &'static str;
}

/// Handler argument proving the caller holds permission `P`.
///
/// Place it before `Path` / `Json` arguments so auth failures are reported first.
pub struct Authorized<P> {
    pub claims: Claims,
    _marker: PhantomData<P>,
}

impl<P> Authorized<P> {
    fn new(claims: Claims) -> Self {
        Self {
            claims,
            _marker: PhantomData,
        }
    }
}

impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: Permission,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = match state.auth.verify(token).await {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(error = %err, reason = err.reason(), "access token verification failed");
                return Err(err.into());
            }
        };

        if let Err(err) = claims.require_permission(P::SCOPE) {
            tracing::warn!(sub = %claims.sub, required = P::SCOPE, "permission check failed");
            return Err(err.into());
        }

        Ok(Self::new(claims))
    }
}

impl<P: Permission> std::fmt::Debug for Authorized<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorized")
            .field("scope", &P::SCOPE)
            .field("sub", &self.claims.sub)
            .finish()
    }
}
