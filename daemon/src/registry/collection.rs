//! エンドポイントコレクション
//!
//! 同じプレフィックスを共有するエンドポイントの集まり。起動時に
//! [`EndpointCollection::register`] でアプリケーションへ登録される。

use super::endpoint::{box_handler, Endpoint, EndpointOptions, RequestContext};
use super::parameters::{ParameterModel, Parameters};
use crate::api::error::{ApiError, HandlerError};
use crate::api::AppBuilder;
use cryptic_daemon_common::error::ConfigurationError;
use cryptic_daemon_common::protocol::CollectionDescription;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::future::Future;

static COLLECTION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9\-_]+(/[a-zA-Z0-9\-_]+)*$").expect("valid collection name regex")
});

static ENDPOINT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+$").expect("valid endpoint name regex"));

/// エンドポイントコレクション
#[derive(Debug)]
pub struct EndpointCollection {
    name: String,
    description: String,
    disabled: bool,
    test: bool,
    endpoints: Vec<Endpoint>,
}

impl EndpointCollection {
    /// コレクションを作成する
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if !COLLECTION_NAME.is_match(&name) {
            return Err(ConfigurationError::InvalidCollectionName(name));
        }
        Ok(Self {
            name,
            description: description.into(),
            disabled: false,
            test: false,
            endpoints: Vec::new(),
        })
    }

    /// デバッグモードでのみ有効にする
    pub fn test(mut self) -> Self {
        self.test = true;
        self
    }

    /// 無効化する
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// コレクション名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 説明
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 登録順のエンドポイント
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// テスト専用か
    pub fn is_test(&self) -> bool {
        self.test
    }

    /// ルートを張るべきか
    pub fn is_enabled(&self, debug: bool) -> bool {
        !self.disabled && (!self.test || debug)
    }

    /// オプション付きでエンドポイントを登録するためのビルダー
    pub fn endpoint(&mut self, name: impl Into<String>, doc: impl Into<String>) -> EndpointBuilder<'_> {
        EndpointBuilder {
            collection: self,
            name: name.into(),
            doc: doc.into(),
            options: EndpointOptions::default(),
        }
    }

    /// エンドポイントを登録する
    ///
    /// 名前の検証、重複検査、パラメータモデルの構築はここで行われる。
    pub fn register_endpoint<P, F, Fut, R>(
        &mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
        handler: F,
    ) -> Result<Endpoint, ConfigurationError>
    where
        P: Parameters,
        F: Fn(RequestContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: Serialize,
    {
        self.endpoint(name, doc).register(handler)
    }

    fn add<P, F, Fut, R>(
        &mut self,
        name: String,
        doc: String,
        options: EndpointOptions,
        handler: F,
    ) -> Result<Endpoint, ConfigurationError>
    where
        P: Parameters,
        F: Fn(RequestContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: Serialize,
    {
        if !ENDPOINT_NAME.is_match(&name) {
            return Err(ConfigurationError::InvalidEndpointName {
                collection: self.name.clone(),
                endpoint: name,
            });
        }
        if self.endpoints.iter().any(|e| e.name() == name) {
            return Err(ConfigurationError::DuplicateEndpoint {
                collection: self.name.clone(),
                endpoint: name,
            });
        }

        let model = ParameterModel::build(&P::signature())?;
        model.check_type::<P>(&format!("/{}/{}", self.name, name))?;
        let endpoint = Endpoint::new(&self.name, &name, &doc, model, box_handler(handler), options);
        self.endpoints.push(endpoint.clone());
        Ok(endpoint)
    }

    /// コレクションをアプリケーションへ登録する
    ///
    /// 無効なコレクションはルートを張らず `None` を返す（無効コレクションの一覧表示が
    /// 有効な場合は空のプレースホルダを返す）。有効なエンドポイントにだけルートを張り、
    /// 全エンドポイントを記述に含める。
    pub fn register(
        self,
        app: &mut AppBuilder,
    ) -> Result<Option<CollectionDescription>, ConfigurationError> {
        app.claim_collection(&self.name)?;
        let debug = app.debug();

        if !self.is_enabled(debug) {
            tracing::info!(collection = %self.name, "endpoint collection is disabled");
            return Ok(app.list_disabled().then(|| CollectionDescription {
                id: self.name.clone(),
                description: self.description.clone(),
                disabled: true,
                endpoints: Vec::new(),
            }));
        }

        let mut endpoints = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            let mut description = endpoint.describe()?;
            description.disabled = !endpoint.is_enabled(debug);
            endpoints.push(description);
        }

        for endpoint in self.endpoints.iter().filter(|e| e.is_enabled(debug)) {
            app.add_endpoint(endpoint.clone())?;
        }

        tracing::info!(
            collection = %self.name,
            endpoints = endpoints.iter().filter(|e| !e.disabled).count(),
            "registered endpoint collection"
        );

        Ok(Some(CollectionDescription {
            id: self.name,
            description: self.description,
            disabled: false,
            endpoints,
        }))
    }
}

/// エンドポイント登録ビルダー
///
/// ```
/// use axum::http::StatusCode;
/// use cryptic_daemon::api::error::{ApiError, HandlerError};
/// use cryptic_daemon::registry::{EndpointCollection, NoParams, RequestContext};
///
/// let mut collection = EndpointCollection::new("maintenance", "maintenance endpoints").unwrap();
/// collection
///     .endpoint("ping", "Check that the daemon is alive\n\n:return: pong")
///     .test()
///     .errors([ApiError::new(StatusCode::CONFLICT, "busy", "The daemon is busy.")])
///     .register(|_ctx: RequestContext, _: NoParams| async { Ok::<_, HandlerError>("pong") })
///     .unwrap();
/// assert_eq!(collection.endpoints().len(), 1);
/// ```
pub struct EndpointBuilder<'a> {
    collection: &'a mut EndpointCollection,
    name: String,
    doc: String,
    options: EndpointOptions,
}

impl EndpointBuilder<'_> {
    /// 無効化する（ルートは張られず、一覧には `disabled: true` で載る）
    pub fn disabled(mut self) -> Self {
        self.options.disabled = true;
        self
    }

    /// デバッグモードでのみ有効にする
    pub fn test(mut self) -> Self {
        self.options.test = true;
        self
    }

    /// 送出しうるドメイン例外を宣言する（ドキュメント生成用）
    pub fn errors(mut self, errors: impl IntoIterator<Item = ApiError>) -> Self {
        self.options.errors.extend(errors);
        self
    }

    /// ハンドラを登録する
    pub fn register<P, F, Fut, R>(self, handler: F) -> Result<Endpoint, ConfigurationError>
    where
        P: Parameters,
        F: Fn(RequestContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: Serialize,
    {
        self.collection
            .add(self.name, self.doc, self.options, handler)
    }
}
