//! serve サブコマンド
//!
//! デーモンを起動します。

use clap::Args;
use cryptic_daemon_common::config::DaemonConfig;

/// serve サブコマンドの引数
///
/// 指定がなければ環境変数（`DAEMON_PORT` / `DAEMON_HOST`）の値を使う。
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,
}

impl ServeArgs {
    /// コマンドライン引数で設定を上書きする
    pub fn apply(&self, mut config: DaemonConfig) -> DaemonConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        config
    }
}
