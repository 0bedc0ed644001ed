//! 起動時チェックとデータベース準備

use crate::db;
use crate::db::session::SessionPool;
use cryptic_daemon_common::config::DaemonConfig;
use cryptic_daemon_common::error::{ConfigurationError, DaemonResult};

/// APIトークンが設定されているか確認する
///
/// デバッグモードでは警告のみ。それ以外では起動を拒否する。
pub fn check_api_token(config: &DaemonConfig) -> Result<(), ConfigurationError> {
    if config.api_token().is_some() {
        return Ok(());
    }
    if config.debug {
        tracing::warn!("No API token specified, endpoints can be accessed without authentication!");
        return Ok(());
    }
    Err(ConfigurationError::Environment(
        "No API token specified (set DAEMON_API_TOKEN)".into(),
    ))
}

/// 接続プールを作り、必要ならテーブルを作成する
pub async fn prepare_database(config: &DaemonConfig) -> DaemonResult<SessionPool> {
    let pool = db::create_pool(config).await?;
    if config.sql_create_tables {
        db::create_tables(&pool).await?;
        tracing::info!("database tables are ready");
    }
    Ok(SessionPool::new(pool))
}
