/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::auth::{AuthError, AuthService, JwksKeyStore};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AuthError> {
    let keys = JwksKeyStore::new(
        config.auth_jwks_url.clone(),
        Duration::from_secs(config.jwks_refresh_seconds),
    )?;

    let auth = AuthService::new(
        Arc::new(keys),
        &config.auth_issuer,
        &config.auth_audience,
        &config.auth_algorithms,
        config.access_token_leeway_seconds,
    );

    Ok(Arc::new(auth))
}
