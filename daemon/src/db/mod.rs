//! データベースアクセス層
//!
//! SQLiteへの接続プール作成、テーブル作成（マイグレーション）、
//! リクエスト単位のセッション管理

/// リクエストスコープのデータベースセッション
pub mod session;

/// カウンターテーブル
pub mod counter;

use cryptic_daemon_common::config::DaemonConfig;
use cryptic_daemon_common::error::{DaemonError, DaemonResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

/// 書き込みロック待ちの上限
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// データベース接続プールを作成
///
/// WALモードで開き、書き込みの競合は [`BUSY_TIMEOUT`] まで待つ。
pub async fn create_pool(config: &DaemonConfig) -> DaemonResult<SqlitePool> {
    ensure_database_dir(&config.database_url)?;

    let mut connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| DaemonError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    if !config.sql_show_statements {
        connect_options = connect_options.disable_statement_logging();
    }

    SqlitePoolOptions::new()
        .max_connections(config.pool_size.max(1))
        .max_lifetime(Duration::from_secs(config.pool_recycle_secs))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| DaemonError::Database(e.to_string()))
}

/// テーブルを作成（埋め込みマイグレーションを実行）
pub async fn create_tables(pool: &SqlitePool) -> DaemonResult<()> {
    tracing::debug!("creating tables");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DaemonError::Database(format!("Migration failed: {}", e)))
}

/// SQLiteファイルの親ディレクトリを作成する
///
/// `sqlite::memory:` のような特殊指定はスキップ
fn ensure_database_dir(database_url: &str) -> DaemonResult<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    if path.starts_with(':') {
        return Ok(());
    }
    let normalized = path.trim_start_matches("//");
    let path_without_params = normalized.split('?').next().unwrap_or(normalized);
    if let Some(parent) = std::path::Path::new(path_without_params).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaemonError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
