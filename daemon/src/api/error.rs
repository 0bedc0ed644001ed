//! APIエラーレスポンス型
//!
//! すべての非2xxレスポンスは `"error"` 文字列を持つJSONオブジェクトになる。
//!
//! - フレームワーク由来: `{"error": "404 Not Found"}`
//! - ドメイン例外: `{...extra, "error": "counter_not_found"}`
//! - 検証エラー: `{"error": "422 Unprocessable Entity", "detail": [...]}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cryptic_daemon_common::error::DaemonError;
use cryptic_daemon_common::protocol::ValidationIssue;
use serde_json::{json, Map, Value};
use std::borrow::Cow;
use std::fmt;

/// `"<code> <reason>"` 形式のステータス表記
pub fn status_line(status: StatusCode) -> String {
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

/// フレームワーク由来のエラーレスポンス
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    status: StatusCode,
    body: Value,
}

impl ErrorResponse {
    /// `{"error": "<code> <reason>"}`
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: json!({ "error": status_line(status) }),
        }
    }

    /// 422とその `detail`
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        Self {
            status,
            body: json!({ "error": status_line(status), "detail": issues }),
        }
    }

    /// ドメイン例外
    pub fn domain(error: &ApiError) -> Self {
        Self {
            status: error.status(),
            body: error.to_json(),
        }
    }

    /// ステータスコード
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// レスポンスボディ
    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// ハンドラが送出するドメイン例外
///
/// ステータスコードと安定したエラーコード文字列を持ち、任意の追加フィールドを
/// レスポンスボディに含められる。
///
/// ```
/// use axum::http::StatusCode;
/// use cryptic_daemon::api::error::ApiError;
///
/// let err = ApiError::new(StatusCode::NOT_FOUND, "counter_not_found", "Counter does not exist")
///     .with("user_id", "abc");
/// assert_eq!(
///     err.to_json(),
///     serde_json::json!({"user_id": "abc", "error": "counter_not_found"})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    code: Cow<'static, str>,
    description: Cow<'static, str>,
    extra: Map<String, Value>,
}

impl ApiError {
    /// ドメイン例外を作成
    pub fn new(
        status: StatusCode,
        code: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            description: description.into(),
            extra: Map::new(),
        }
    }

    /// レスポンスボディに追加フィールドを付与する
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// ステータスコード
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// エラーコード
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 説明（ドキュメント用）
    pub fn description(&self) -> &str {
        &self.description
    }

    /// `{...extra, "error": code}`
    pub fn to_json(&self) -> Value {
        let mut body = self.extra.clone();
        body.insert("error".into(), Value::String(self.code.to_string()));
        Value::Object(body)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.code, self.description)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ErrorResponse::domain(&self).into_response()
    }
}

/// ハンドラの失敗
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// ドメイン例外（そのままクライアントへ返す）
    #[error(transparent)]
    Api(#[from] ApiError),

    /// インフラ系エラー（500）
    #[error(transparent)]
    Daemon(#[from] DaemonError),

    /// その他の内部エラー（500）
    #[error("Internal error: {0}")]
    Internal(String),
}

/// リクエストディスパッチの失敗
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// 呼び出し元IDがない（401）
    #[error("caller identity is missing")]
    Unauthorized,

    /// 入力検証エラー（422）
    #[error("request validation failed: {0:?}")]
    Validation(Vec<ValidationIssue>),

    /// ドメイン例外
    #[error(transparent)]
    Domain(ApiError),

    /// 内部エラー（500、詳細はログのみ）
    #[error("{0}")]
    Internal(String),
}

impl From<HandlerError> for DispatchError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Api(err) => Self::Domain(err),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<DispatchError> for ErrorResponse {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Unauthorized => ErrorResponse::status(StatusCode::UNAUTHORIZED),
            DispatchError::Validation(issues) => ErrorResponse::validation(issues),
            DispatchError::Domain(err) => ErrorResponse::domain(&err),
            DispatchError::Internal(_) => ErrorResponse::status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}
