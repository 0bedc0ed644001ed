use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cryptic_daemon::api;
use cryptic_daemon::db::{self, session::SessionPool};
use cryptic_daemon::endpoints;
use cryptic_daemon::registry::EndpointCollection;
use cryptic_daemon_common::config::DaemonConfig;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

/// テストで使うAPIトークン
pub const TOKEN: &str = "T1";

/// テストで使う呼び出し元ID
pub const USER: &str = "6f1e2d3c-4b5a-4978-8695-a4b3c2d1e0f9";

/// もう1人の呼び出し元ID
pub const OTHER_USER: &str = "0b7a3c55-2a4f-4d8e-9f3b-7d1c2e6a5f40";

/// テスト用のインメモリSQLiteセッションプールを作成する
pub async fn create_test_sessions() -> SessionPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    db::create_tables(&pool)
        .await
        .expect("Failed to run migrations");
    SessionPool::new(pool)
}

/// デバッグモード・トークン `T1` の設定
pub fn test_config() -> DaemonConfig {
    DaemonConfig {
        debug: true,
        api_token: Some(TOKEN.to_string()),
        ..Default::default()
    }
}

/// `.oneshot()` でリクエストを送るためのテスト用デーモン
pub struct TestDaemon {
    pub router: Router,
    pub sessions: SessionPool,
}

impl TestDaemon {
    /// 組み込みコレクションで起動する
    pub async fn new(config: DaemonConfig) -> Self {
        let collections = endpoints::collections().expect("built-in collections");
        Self::with_collections(config, collections).await
    }

    /// 任意のコレクションで起動する
    pub async fn with_collections(
        config: DaemonConfig,
        collections: Vec<EndpointCollection>,
    ) -> Self {
        let sessions = create_test_sessions().await;
        Self::with_sessions(config, sessions, collections)
    }

    /// 用意済みのセッションプールで起動する
    pub fn with_sessions(
        config: DaemonConfig,
        sessions: SessionPool,
        collections: Vec<EndpointCollection>,
    ) -> Self {
        let router = api::create_app(&config, sessions.clone(), collections)
            .expect("registration should succeed");
        Self { router, sessions }
    }

    /// 任意のリクエストを送る
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        (status, body)
    }

    /// トークン `T1` と呼び出し元 `USER` でPOSTする
    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.post_as(path, Some(TOKEN), Some(USER), body).await
    }

    /// トークンと呼び出し元を指定してPOSTする
    pub async fn post_as(
        &self,
        path: &str,
        token: Option<&str>,
        user: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.post_raw(path, token, user, body.to_string()).await
    }

    /// 生のボディでPOSTする
    pub async fn post_raw(
        &self,
        path: &str,
        token: Option<&str>,
        user: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        self.send(builder.body(body.into()).unwrap()).await
    }

    /// GETする
    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// 開かれたセッションがすべて解放されていることを確認する
    pub fn assert_sessions_balanced(&self) {
        assert_eq!(
            self.sessions.opened(),
            self.sessions.released(),
            "every opened session must be released"
        );
        assert_eq!(self.sessions.active(), 0);
    }
}
