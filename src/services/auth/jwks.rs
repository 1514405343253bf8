//! JWKS (JSON Web Key Set) による署名鍵の解決
//!
//! - `KeySource`: kid から `DecodingKey` を引く抽象
//! - `JwksKeyStore`: identity provider の JWKS endpoint から取得してキャッシュする
//! - `StaticKeySet`: 固定の鍵セット (テストやオフライン検証用)
use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{JwkSet, PublicKeyUse};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use url::Url;

use crate::services::auth::AuthError;

// Unknown kids do not refetch more often than this.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError>;
}

/// Build `kid -> DecodingKey` from a key set. Keys without a kid, keys marked for
/// encryption, and keys jsonwebtoken can't use are skipped.
fn decoding_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
                return None;
            }
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(err) => {
                    warn!(kid = %kid, error = %err, "skipping unusable jwk");
                    None
                }
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct StaticKeySet {
    keys: HashMap<String, DecodingKey>,
}

impl StaticKeySet {
    pub fn new(set: &JwkSet) -> Self {
        Self {
            keys: decoding_keys(set),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let set: JwkSet = serde_json::from_str(json)
            .map_err(|e| AuthError::KeySetUnavailable(format!("invalid jwks document: {e}")))?;
        Ok(Self::new(&set))
    }
}

impl std::fmt::Debug for StaticKeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("StaticKeySet")
            .field("kids", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl KeySource for StaticKeySet {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self.keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }
}

struct CacheEntry {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Remote JWKS with caching.
///
/// Keys are fetched lazily on first use, refreshed when older than `refresh_interval`
/// or when an unknown kid shows up (key rotation). Concurrent misses share one fetch.
/// If a refresh fails, the previous keys keep being served.
pub struct JwksKeyStore {
    url: Url,
    client: reqwest::Client,
    refresh_interval: Duration,
    min_refetch_interval: Duration,
    cache: RwLock<Option<CacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for JwksKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksKeyStore")
            .field("url", &self.url.as_str())
            .field("refresh_interval", &self.refresh_interval)
            .finish()
    }
}

impl JwksKeyStore {
    pub fn new(url: Url, refresh_interval: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("http client: {e}")))?;

        Ok(Self {
            url,
            client,
            refresh_interval,
            min_refetch_interval: MIN_REFETCH_INTERVAL,
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    async fn cached(&self, kid: &str, fresh_only: bool) -> Option<DecodingKey> {
        let cache = self.cache.read().await;
        let entry = cache.as_ref()?;
        if fresh_only && entry.fetched_at.elapsed() >= self.refresh_interval {
            return None;
        }
        entry.keys.get(kid).cloned()
    }

    async fn fetched_recently(&self) -> bool {
        self.cache
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.min_refetch_interval)
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        debug!(url = %self.url, "fetching jwks");

        let set: JwkSet = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("invalid jwks document: {e}")))?;

        let keys = decoding_keys(&set);
        debug!(count = keys.len(), "jwks loaded");

        *self.cache.write().await = Some(CacheEntry {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl KeySource for JwksKeyStore {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cached(kid, true).await {
            return Ok(key);
        }

        let _guard = self.refresh_lock.lock().await;

        // another caller may have refreshed while we waited
        if let Some(key) = self.cached(kid, true).await {
            return Ok(key);
        }
        // throttled: a stale but known key is still good, an unknown kid waits
        if self.fetched_recently().await {
            return self
                .cached(kid, false)
                .await
                .ok_or_else(|| AuthError::UnknownKey(kid.to_string()));
        }

        match self.refresh().await {
            Ok(()) => self
                .cached(kid, false)
                .await
                .ok_or_else(|| AuthError::UnknownKey(kid.to_string())),
            Err(err) => match self.cached(kid, false).await {
                Some(key) => {
                    warn!(error = %err, "jwks refresh failed, serving cached key");
                    Ok(key)
                }
                None => {
                    warn!(error = %err, url = %self.url, "jwks refresh failed");
                    Err(err)
                }
            },
        }
    }
}
