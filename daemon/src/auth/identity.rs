//! 呼び出し元IDの解決
//!
//! `user_id` を受け取るエンドポイントには、前段のゲートウェイが付与する
//! `X-User-Id` ヘッダーの値が注入される。ボディ中の `user_id` は使われない。

use crate::api::error::DispatchError;
use axum::http::HeaderMap;
use cryptic_daemon_common::protocol::ValidationIssue;
use uuid::Uuid;

/// 呼び出し元IDを運ぶヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";

/// ヘッダーから呼び出し元IDを取り出し、小文字ハイフン区切りのUUIDに正規化する
///
/// ヘッダーがなければ [`DispatchError::Unauthorized`]、UUIDとして不正なら
/// `["header", "x-user-id"]` を指す検証エラーになる。
pub fn resolve_identity(headers: &HeaderMap) -> Result<String, DispatchError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or(DispatchError::Unauthorized)?;

    raw.to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.hyphenated().to_string())
        .ok_or_else(|| {
            DispatchError::Validation(vec![ValidationIssue::new(
                ["header", USER_ID_HEADER],
                "value is not a valid uuid",
                "type_error.uuid",
            )])
        })
}
