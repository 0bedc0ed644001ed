// 認証モジュール

/// 認可ゲートのミドルウェア
pub mod middleware;

/// 呼び出し元IDの解決
pub mod identity;

use axum::http::{header, HeaderMap};
use std::sync::Arc;

/// Bearerトークンのプレフィックス
pub const BEARER_PREFIX: &str = "Bearer ";

/// 認可ゲート
///
/// トークン未設定（または空文字列）の場合はすべてのリクエストを通す。
/// 設定されている場合は `Authorization: Bearer <token>` と完全一致するものだけを通す。
#[derive(Debug, Clone, Default)]
pub struct Authorization {
    token: Option<Arc<str>>,
}

impl Authorization {
    /// 認可ゲートを作成
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(Arc::from),
        }
    }

    /// トークンが未設定で誰でも通れるか
    pub fn is_open(&self) -> bool {
        self.token.is_none()
    }

    /// リクエストヘッダーを検査する
    pub fn check(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return true;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .is_some_and(|token| token == expected)
    }
}
