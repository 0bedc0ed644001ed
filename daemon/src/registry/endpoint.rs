//! 登録済みエンドポイント

use super::doc::EndpointDoc;
use super::parameters::{ParameterModel, Parameters};
use crate::api::error::{ApiError, DispatchError, HandlerError};
use crate::db::session::Session;
use cryptic_daemon_common::error::ConfigurationError;
use cryptic_daemon_common::protocol::{EndpointDescription, ParameterDescription};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// ハンドラに渡されるリクエストコンテキスト
#[derive(Debug, Clone)]
pub struct RequestContext {
    session: Session,
    request_id: Uuid,
}

impl RequestContext {
    /// コンテキストを作成
    pub fn new(session: Session, request_id: Uuid) -> Self {
        Self {
            session,
            request_id,
        }
    }

    /// リクエストスコープのDBセッション
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// リクエストID（ログ相関用）
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

/// 型消去されたハンドラの戻り値
pub type HandlerFuture = BoxFuture<'static, Result<Value, DispatchError>>;

/// 型消去されたハンドラ
pub type BoxedHandler = Arc<dyn Fn(RequestContext, Map<String, Value>) -> HandlerFuture + Send + Sync>;

/// 型付きハンドラを型消去する
///
/// 検証済み引数から `P` を組み立て、戻り値をJSONへ変換する。
pub(crate) fn box_handler<P, F, Fut, R>(handler: F) -> BoxedHandler
where
    P: Parameters,
    F: Fn(RequestContext, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
    R: Serialize,
{
    Arc::new(move |context: RequestContext, arguments: Map<String, Value>| -> HandlerFuture {
        match serde_json::from_value::<P>(Value::Object(arguments)) {
            Ok(params) => {
                let fut = handler(context, params);
                async move {
                    let value = fut.await?;
                    serde_json::to_value(value).map_err(|e| {
                        DispatchError::Internal(format!("Failed to serialize response: {}", e))
                    })
                }
                .boxed()
            }
            // 検証済みの引数が組み立てられないのはサーバー側の不整合
            Err(e) => {
                let message = format!("Failed to build handler parameters: {}", e);
                async move { Err(DispatchError::Internal(message)) }.boxed()
            }
        }
    })
}

struct EndpointInner {
    name: String,
    collection: String,
    doc: String,
    model: ParameterModel,
    handler: BoxedHandler,
    disabled: bool,
    test: bool,
    errors: Vec<ApiError>,
}

/// 登録済みエンドポイント（クローンは同じ実体を共有する）
#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<EndpointInner>,
}

/// エンドポイントの登録オプション
#[derive(Debug, Clone, Default)]
pub(crate) struct EndpointOptions {
    pub disabled: bool,
    pub test: bool,
    pub errors: Vec<ApiError>,
}

impl Endpoint {
    pub(crate) fn new(
        collection: &str,
        name: &str,
        doc: &str,
        model: ParameterModel,
        handler: BoxedHandler,
        options: EndpointOptions,
    ) -> Self {
        Self {
            inner: Arc::new(EndpointInner {
                name: name.to_string(),
                collection: collection.to_string(),
                doc: doc.to_string(),
                model,
                handler,
                disabled: options.disabled,
                test: options.test,
                errors: options.errors,
            }),
        }
    }

    /// エンドポイント名
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 所属するコレクション名
    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    /// ルーティングパス `/{collection}/{endpoint}`
    pub fn path(&self) -> String {
        format!("/{}/{}", self.inner.collection, self.inner.name)
    }

    /// パラメータモデル
    pub fn model(&self) -> &ParameterModel {
        &self.inner.model
    }

    /// 宣言されたドメイン例外
    pub fn errors(&self) -> &[ApiError] {
        &self.inner.errors
    }

    /// 無効化フラグ
    pub fn is_disabled(&self) -> bool {
        self.inner.disabled
    }

    /// テスト専用フラグ
    pub fn is_test(&self) -> bool {
        self.inner.test
    }

    /// ルートを張るべきか
    pub fn is_enabled(&self, debug: bool) -> bool {
        !self.inner.disabled && (!self.inner.test || debug)
    }

    /// docstringを解析し、パラメータモデルと照合する
    pub fn doc(&self) -> Result<EndpointDoc, ConfigurationError> {
        let path = self.path();
        let doc = EndpointDoc::parse(&path, &self.inner.doc)?;
        doc.check(&path, &self.inner.model)?;
        Ok(doc)
    }

    /// `/daemon/endpoints` 用の記述を生成する
    pub fn describe(&self) -> Result<EndpointDescription, ConfigurationError> {
        let doc = self.doc()?;
        let parameters = self
            .inner
            .model
            .public()
            .map(|parameter| ParameterDescription {
                id: parameter.name().to_string(),
                description: doc.param(parameter.name()).unwrap_or_default().to_string(),
                required: parameter.required(),
            })
            .collect();

        Ok(EndpointDescription {
            id: self.inner.name.clone(),
            description: doc.description().to_string(),
            disabled: self.inner.disabled,
            parameters,
        })
    }

    /// 検証済み引数でハンドラを呼び出す
    pub fn call(&self, context: RequestContext, arguments: Map<String, Value>) -> HandlerFuture {
        (self.inner.handler)(context, arguments)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path())
            .field("disabled", &self.inner.disabled)
            .field("test", &self.inner.test)
            .finish_non_exhaustive()
    }
}
