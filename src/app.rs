/*
 * Responsibility
 * - tracing 初期化 → Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (HTTP/CORS/security headers)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::dto::drinks::{Ingredient, serialize_recipe};
use crate::config::Config;
use crate::middleware;
use crate::repos::{DrinkStore, PgDrinkStore, RepoError};
use crate::services::auth::build_auth_service;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,drinks_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // surface panics via tracing so they don't get lost with stderr
        tracing::error!(?info, "panic");

        // development: fail fast / production: default hook, server keeps running
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting drinks API in {:?} mode on {} (auth domain {})",
        config.app_env,
        config.addr,
        config.auth_domain
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let drinks: Arc<dyn DrinkStore> = Arc::new(PgDrinkStore::new(pool));
    prepare_store(drinks.as_ref(), config.should_reset_store())
        .await
        .context("failed to prepare drinks schema")?;

    let auth = build_auth_service(config).context("failed to build auth service")?;

    Ok(AppState::new(drinks, auth))
}

/// Ensure the schema exists. With `reset`, drop everything first and seed one sample drink.
pub async fn prepare_store(store: &dyn DrinkStore, reset: bool) -> Result<(), RepoError> {
    if !reset {
        return store.migrate().await;
    }

    tracing::warn!(backend = store.backend_name(), "resetting drinks store");
    store.reset().await?;

    let recipe = vec![Ingredient {
        name: "water".to_string(),
        color: "blue".to_string(),
        parts: 1,
    }];
    // a Vec of plain structs always serializes
    let recipe = serialize_recipe(&recipe).unwrap_or_else(|_| "[]".to_string());
    store.create("water", &recipe).await?;

    Ok(())
}

/// API routes + fallback + HTTP-level middleware. CORS is added by `build_router`.
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .merge(api::v1::routes())
        .fallback(api::v1::handlers::fallback::not_found)
        .method_not_allowed_fallback(api::v1::handlers::fallback::method_not_allowed)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    middleware::cors::apply(router(state), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::MemoryDrinkStore;

    #[tokio::test]
    async fn prepare_without_reset_keeps_rows() {
        let store = MemoryDrinkStore::new();
        store.create("Tea", "[]").await.unwrap();

        prepare_store(&store, false).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn prepare_with_reset_seeds_water() {
        let store = MemoryDrinkStore::new();
        store.create("Tea", "[]").await.unwrap();

        prepare_store(&store, true).await.unwrap();
        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "water");
        assert_eq!(
            rows[0].recipe,
            r#"[{"name":"water","color":"blue","parts":1}]"#
        );
    }
}
