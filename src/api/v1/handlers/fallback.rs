/*
 * Responsibility
 * - 未定義 route も JSON の 404 body で返す
 * - route はあるが method が違う場合は JSON の 405
 */
use crate::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
