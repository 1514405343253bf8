/*!
 * Authorization extractor
 *
 * Responsibility:
 * - bearer token を検証し、route ごとの permission を確認して Claims を handler に渡す
 * - HTTP / axum 依存は core に閉じ込め、permission の型定義は types に分離する
 *
 * Public API:
 * - Authorized<P>, Permission
 * - CanGetDrinksDetail などの alias
 */

mod core;
mod types;

pub use self::core::{Authorized, Permission};
pub use types::*;
