//! 設定管理
//!
//! DaemonConfig 等の設定構造体

use serde::{Deserialize, Serialize};

/// デーモン設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// デバッグモード（テスト用コレクションを有効化し、トークン未設定でも起動を許可）
    #[serde(default)]
    pub debug: bool,

    /// APIトークン（未設定の場合は認証なし）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// ログレベル (デフォルト: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// データベースURL (デフォルト: "sqlite://daemon.db")
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// コネクションプールの最大接続数 (デフォルト: 20)
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// 接続を再生成するまでの秒数 (デフォルト: 300)
    #[serde(default = "default_pool_recycle_secs")]
    pub pool_recycle_secs: u64,

    /// 実行SQLをログ出力するか
    #[serde(default)]
    pub sql_show_statements: bool,

    /// 起動時にテーブルを作成するか（マイグレーション実行）
    #[serde(default)]
    pub sql_create_tables: bool,

    /// 無効化されたコレクションも `/daemon/endpoints` に掲載するか
    #[serde(default)]
    pub list_disabled: bool,

    /// エラー報告先のSentry DSN（未設定なら送信しない）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentry_dsn: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_url() -> String {
    "sqlite://daemon.db".to_string()
}

fn default_pool_size() -> u32 {
    20
}

fn default_pool_recycle_secs() -> u64 {
    300
}

impl DaemonConfig {
    /// バインドアドレス（`host:port`）を返す
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 空文字列を除いたAPIトークンを返す
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|token| !token.is_empty())
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            api_token: None,
            log_level: default_log_level(),
            database_url: default_database_url(),
            pool_size: default_pool_size(),
            pool_recycle_secs: default_pool_recycle_secs(),
            sql_show_statements: false,
            sql_create_tables: false,
            list_disabled: false,
            sentry_dsn: None,
        }
    }
}
