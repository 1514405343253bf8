/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認可は handler 引数の Authorized<P> extractor で route ごとに宣言する
 *   (GET /drinks と /health は public)
 */
use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    drinks::{create_drink, delete_drink, list_drink_details, list_drinks, update_drink},
    health::health,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(list_drink_details))
        .route(
            "/drinks/{drink_id}",
            patch(update_drink).delete(delete_drink),
        )
}
