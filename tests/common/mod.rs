//! Shared harness: the real router wired to an in-memory store and a static key set.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use drinks_api::{
    app,
    repos::{DrinkRow, DrinkStore, MemoryDrinkStore, RepoError},
    services::auth::{AuthService, StaticKeySet},
    state::AppState,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ISSUER: &str = "https://drinks-test.example.com/";
pub const AUDIENCE: &str = "drinks";
pub const KID: &str = "test-key-1";

const JWKS: &str = include_str!("../fixtures/test_jwks.json");
const PRIVATE_KEY_PEM: &[u8] = include_bytes!("../fixtures/test_rsa_private.pem");

pub const ALL_PERMISSIONS: [&str; 4] = [
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDrinkStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryDrinkStore::new());
        let drinks: Arc<dyn DrinkStore> = store.clone();
        Self::build(store, drinks)
    }

    /// Reads go to the in-memory store, every write fails with a database error.
    pub fn with_failing_writes() -> Self {
        let store = Arc::new(MemoryDrinkStore::new());
        let drinks: Arc<dyn DrinkStore> = Arc::new(FailingWrites {
            inner: store.clone(),
        });
        Self::build(store, drinks)
    }

    fn build(store: Arc<MemoryDrinkStore>, drinks: Arc<dyn DrinkStore>) -> Self {
        let keys = Arc::new(StaticKeySet::from_json(JWKS).expect("fixture jwks parses"));
        let auth = Arc::new(AuthService::new(
            keys,
            ISSUER,
            AUDIENCE,
            &[Algorithm::RS256],
            0,
        ));
        let router = app::router(AppState::new(drinks, auth));

        Self { router, store }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible");
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request builds")).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    /// Insert a drink directly through the store, bypassing auth.
    pub async fn seed(&self, title: &str, recipe: Value) -> i64 {
        self.store
            .create(title, &recipe.to_string())
            .await
            .expect("seed insert")
            .id
    }
}

struct FailingWrites {
    inner: Arc<MemoryDrinkStore>,
}

fn db_down() -> RepoError {
    RepoError::Db(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl DrinkStore for FailingWrites {
    fn backend_name(&self) -> &'static str {
        "failing-writes"
    }

    async fn migrate(&self) -> Result<(), RepoError> {
        Err(db_down())
    }

    async fn reset(&self) -> Result<(), RepoError> {
        Err(db_down())
    }

    async fn list(&self) -> Result<Vec<DrinkRow>, RepoError> {
        self.inner.list().await
    }

    async fn get(&self, id: i64) -> Result<Option<DrinkRow>, RepoError> {
        self.inner.get(id).await
    }

    async fn create(&self, _title: &str, _recipe: &str) -> Result<DrinkRow, RepoError> {
        Err(db_down())
    }

    async fn update(
        &self,
        _id: i64,
        _title: Option<&str>,
        _recipe: Option<&str>,
    ) -> Result<Option<DrinkRow>, RepoError> {
        Err(db_down())
    }

    async fn delete(&self, _id: i64) -> Result<bool, RepoError> {
        Err(db_down())
    }
}

pub fn water_recipe() -> Value {
    json!([{ "name": "Water", "color": "blue", "parts": 1 }])
}

pub fn base_claims() -> Value {
    let now = jsonwebtoken::get_current_timestamp();
    json!({
        "iss": ISSUER,
        "sub": "auth0|manager",
        "aud": [AUDIENCE, "https://drinks-test.example.com/userinfo"],
        "iat": now,
        "exp": now + 3600,
    })
}

pub fn sign(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM).expect("fixture key parses");
    jsonwebtoken::encode(&header, claims, &key).expect("token signs")
}

/// Token with the given permissions claim.
pub fn token(permissions: &[&str]) -> String {
    let mut claims = base_claims();
    claims["permissions"] = json!(permissions);
    sign(&claims, KID)
}

/// Token with every drinks permission.
pub fn manager_token() -> String {
    token(&ALL_PERMISSIONS)
}
