//! リクエストディスパッチャ
//!
//! 認可ゲートを通過したリクエストを処理する:
//!
//! 1. リクエストスコープのセッションを開く
//! 2. 呼び出し元IDを解決し、ボディを検証する
//! 3. ハンドラを呼び出す（パニックも捕捉する）
//! 4. セッションを閉じる（どの経路でも必ず1回）
//! 5. 結果をJSONレスポンスへ変換する

use super::error::{DispatchError, ErrorResponse};
use crate::auth::identity::resolve_identity;
use crate::registry::parameters::parse_body;
use crate::registry::{Endpoint, RequestContext};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use uuid::Uuid;

/// エンドポイントへのリクエストを処理する
pub async fn dispatch(
    endpoint: Endpoint,
    state: AppState,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    // 上限超過などでボディを読めなかった場合もJSONのエラーボディで返す
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(
                request_id = %request_id,
                endpoint = %endpoint.path(),
                "failed to read request body: {}",
                rejection.body_text()
            );
            return ErrorResponse::status(rejection.status()).into_response();
        }
    };

    match run(&endpoint, &state, &headers, &body, request_id).await {
        Ok(value) => Json(value).into_response(),
        Err(err) => {
            match &err {
                DispatchError::Internal(message) => tracing::error!(
                    request_id = %request_id,
                    endpoint = %endpoint.path(),
                    "internal error: {}",
                    message
                ),
                other => tracing::debug!(
                    request_id = %request_id,
                    endpoint = %endpoint.path(),
                    "request failed: {}",
                    other
                ),
            }
            ErrorResponse::from(err).into_response()
        }
    }
}

async fn run(
    endpoint: &Endpoint,
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    request_id: Uuid,
) -> Result<Value, DispatchError> {
    let scope = state
        .sessions
        .open()
        .await
        .map_err(|e| DispatchError::Internal(e.to_string()))?;
    let context = RequestContext::new(scope.session(), request_id);

    let outcome = AssertUnwindSafe(invoke(endpoint, context, headers, body))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(DispatchError::Internal(format!(
                "handler panicked: {}",
                panic_message(panic.as_ref())
            )))
        });

    let closed = scope.close().await;
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(DispatchError::Internal(e.to_string())),
        (Err(err), Err(e)) => {
            tracing::warn!(request_id = %request_id, "failed to close session: {}", e);
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
    }
}

async fn invoke(
    endpoint: &Endpoint,
    context: RequestContext,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Value, DispatchError> {
    let identity = if endpoint.model().requires_identity() {
        Some(resolve_identity(headers)?)
    } else {
        None
    };
    let body = parse_body(body).map_err(DispatchError::Validation)?;
    let arguments = endpoint
        .model()
        .validate(body, identity.as_deref())
        .map_err(DispatchError::Validation)?;

    endpoint.call(context, arguments).await
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
