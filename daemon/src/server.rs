//! axumサーバー起動・シャットダウンハンドリング

use crate::shutdown::ShutdownController;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

/// リスナーでaxumサーバーを起動し、シャットダウンシグナルを待機する
///
/// 登録はすべて済んだ状態の `app` を受け取る。
pub async fn run(
    app: Router,
    listener: TcpListener,
    shutdown: ShutdownController,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Daemon listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// シャットダウンシグナルを待機
async fn shutdown_signal(shutdown: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = shutdown.wait() => {
            info!("Shutdown requested, shutting down...");
        }
    }
}
