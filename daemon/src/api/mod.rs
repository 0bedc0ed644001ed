//! HTTPアプリケーションの組み立て
//!
//! コレクションを登録してルートを張り、`/daemon/endpoints`、404フォールバック、
//! リクエストトレースを付けたルーターを作る。

/// リクエストディスパッチャ
pub mod dispatch;

/// APIエラーレスポンス型
pub mod error;

use crate::auth::middleware::authorization_middleware;
use crate::auth::Authorization;
use crate::db::session::SessionPool;
use crate::registry::{Endpoint, EndpointCollection};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cryptic_daemon_common::config::DaemonConfig;
use cryptic_daemon_common::error::ConfigurationError;
use cryptic_daemon_common::protocol::CollectionDescription;
use error::ErrorResponse;
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 自己記述エンドポイントのパス
pub const ENDPOINTS_PATH: &str = "/daemon/endpoints";

/// 登録中のアプリケーション
///
/// [`EndpointCollection::register`] からルートを受け取り、重複を検出する。
pub struct AppBuilder {
    router: Router<AppState>,
    routes: HashSet<String>,
    collections: HashSet<String>,
    authorization: Authorization,
    debug: bool,
    list_disabled: bool,
}

impl AppBuilder {
    /// 空のアプリケーションを作成
    pub fn new(authorization: Authorization, debug: bool, list_disabled: bool) -> Self {
        Self {
            router: Router::new(),
            routes: HashSet::from([ENDPOINTS_PATH.to_string()]),
            collections: HashSet::new(),
            authorization,
            debug,
            list_disabled,
        }
    }

    /// 設定から作成
    pub fn from_config(config: &DaemonConfig) -> Self {
        Self::new(
            Authorization::new(config.api_token.clone()),
            config.debug,
            config.list_disabled,
        )
    }

    /// デバッグモードか（テスト用コレクションが有効になる）
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// 無効なコレクションもプレースホルダとして一覧に載せるか
    pub fn list_disabled(&self) -> bool {
        self.list_disabled
    }

    /// コレクション名を予約する
    pub(crate) fn claim_collection(&mut self, name: &str) -> Result<(), ConfigurationError> {
        if !self.collections.insert(name.to_string()) {
            return Err(ConfigurationError::DuplicateCollection(name.to_string()));
        }
        Ok(())
    }

    /// エンドポイントのルートを張る
    pub(crate) fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), ConfigurationError> {
        let path = endpoint.path();
        if !self.routes.insert(path.clone()) {
            return Err(ConfigurationError::RouteConflict(path));
        }

        let handler = move |State(state): State<AppState>,
                            headers: HeaderMap,
                            body: Result<Bytes, BytesRejection>| {
            dispatch::dispatch(endpoint.clone(), state, headers, body)
        };
        let route = post(handler)
            .route_layer(middleware::from_fn_with_state(
                self.authorization.clone(),
                authorization_middleware,
            ))
            .fallback(method_not_allowed);

        tracing::debug!(path = %path, "bound endpoint route");
        self.router = std::mem::take(&mut self.router).route(&path, route);
        Ok(())
    }

    /// コレクションをまとめて登録する
    pub fn register_all(
        &mut self,
        collections: impl IntoIterator<Item = EndpointCollection>,
    ) -> Result<Vec<CollectionDescription>, ConfigurationError> {
        let mut descriptions = Vec::new();
        for collection in collections {
            if let Some(description) = collection.register(self)? {
                descriptions.push(description);
            }
        }
        Ok(descriptions)
    }

    /// ルーターを完成させる
    pub fn finish(self, sessions: SessionPool, endpoints: Vec<CollectionDescription>) -> Router {
        let state = AppState {
            sessions,
            endpoints: Arc::new(endpoints),
        };
        let introspection = get(list_endpoints)
            .route_layer(middleware::from_fn_with_state(
                self.authorization,
                authorization_middleware,
            ))
            .fallback(method_not_allowed);

        self.router
            .route(ENDPOINTS_PATH, introspection)
            .fallback(not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// 設定とコレクションからアプリケーションを作成
pub fn create_app(
    config: &DaemonConfig,
    sessions: SessionPool,
    collections: impl IntoIterator<Item = EndpointCollection>,
) -> Result<Router, ConfigurationError> {
    let mut builder = AppBuilder::from_config(config);
    let endpoints = builder.register_all(collections)?;
    Ok(builder.finish(sessions, endpoints))
}

/// GET /daemon/endpoints
async fn list_endpoints(State(state): State<AppState>) -> Response {
    Json(state.endpoints.as_slice()).into_response()
}

async fn not_found() -> ErrorResponse {
    ErrorResponse::status(StatusCode::NOT_FOUND)
}

async fn method_not_allowed() -> ErrorResponse {
    ErrorResponse::status(StatusCode::METHOD_NOT_ALLOWED)
}
