/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 認可 (permission check) は extractor 側 (api::v1::extractors::auth_ctx)
 */
pub mod cors;
pub mod http;
pub mod security_headers;
