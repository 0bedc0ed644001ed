//! ロギング初期化ユーティリティ
//!
//! `tracing-subscriber` のグローバルサブスクライバを一度だけ登録する。
//! `RUST_LOG` が設定されている場合は設定値より優先される。
//! Sentry DSN が設定されていれば `error!` はSentryへ、それ以下は
//! パンくずとして送られる。

use once_cell::sync::OnceCell;
use sentry::ClientInitGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceCell<()> = OnceCell::new();

/// ロギング初期化エラー
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// フィルタ式が不正
    #[error("invalid log filter {filter:?}: {message}")]
    Filter {
        /// 指定されたフィルタ
        filter: String,
        /// パーサのエラーメッセージ
        message: String,
    },
    /// Sentry DSN が不正
    #[error("invalid Sentry DSN: {0}")]
    SentryDsn(String),
    /// サブスクライバの登録に失敗
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// ログフィルタを構築する
///
/// `RUST_LOG` を優先し、未設定なら `level`（例: `info`, `debug`）を使う。
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = level.trim().to_ascii_lowercase();
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
        filter: directive,
        message: e.to_string(),
    })
}

/// Sentryクライアントを初期化する
///
/// DSN が未設定または空なら `None`。返されたガードが生きている間だけ送信される。
pub fn init_sentry(dsn: Option<&str>) -> Result<Option<ClientInitGuard>, LoggingError> {
    let Some(dsn) = dsn.map(str::trim).filter(|dsn| !dsn.is_empty()) else {
        return Ok(None);
    };
    let dsn = dsn
        .parse::<sentry::types::Dsn>()
        .map_err(|e| LoggingError::SentryDsn(e.to_string()))?;

    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        ..Default::default()
    });
    Ok(guard.is_enabled().then_some(guard))
}

/// グローバルサブスクライバを登録する（2回目以降は何もしない）
///
/// Sentryを有効にした場合はガードを返す。呼び出し側はプロセス終了まで保持すること。
pub fn init(level: &str, sentry_dsn: Option<&str>) -> Result<Option<ClientInitGuard>, LoggingError> {
    let mut guard = None;
    LOGGING.get_or_try_init(|| {
        let filter = build_filter(level)?;
        guard = init_sentry(sentry_dsn)?;
        let sentry_layer = guard.is_some().then(sentry_tracing::layer);

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .with(sentry_layer)
            .try_init()
            .map_err(|e| LoggingError::Subscriber(e.to_string()))
    })?;
    Ok(guard)
}
