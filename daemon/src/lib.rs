//! cryptic-daemon
//!
//! 認証付きJSONエンドポイントを公開する内部向けHTTPデーモン

#![warn(missing_docs)]

/// HTTPアプリケーションの組み立て・ディスパッチ・エラーレスポンス
pub mod api;

/// 認可ゲートと呼び出し元ID
pub mod auth;

/// 起動時チェック
pub mod bootstrap;

/// コマンドライン引数
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// エンドポイントドキュメント生成
pub mod docs;

/// 組み込みのエンドポイントコレクション
pub mod endpoints;

/// ロギング初期化ユーティリティ
pub mod logging;

/// エンドポイント登録フレームワーク
pub mod registry;

/// axumサーバー起動・シャットダウンハンドリング
pub mod server;

/// 協調的シャットダウン
pub mod shutdown;

use cryptic_daemon_common::protocol::CollectionDescription;
use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// リクエストスコープのセッションを払い出すプール
    pub sessions: db::session::SessionPool,
    /// `/daemon/endpoints` が返す記述（起動時に確定）
    pub endpoints: Arc<Vec<CollectionDescription>>,
}
