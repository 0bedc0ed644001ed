// 認可ゲートのミドルウェア実装

use super::Authorization;
use crate::api::error::ErrorResponse;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// 認可ミドルウェア
///
/// 失敗時は `403 {"error": "403 Forbidden"}` を返し、後続のハンドラは実行しない
/// （セッションも開かれない）。
pub async fn authorization_middleware(
    State(authorization): State<Authorization>,
    request: Request,
    next: Next,
) -> Result<Response, ErrorResponse> {
    if !authorization.check(request.headers()) {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected request with missing or invalid bearer token"
        );
        return Err(ErrorResponse::status(StatusCode::FORBIDDEN));
    }
    Ok(next.run(request).await)
}
