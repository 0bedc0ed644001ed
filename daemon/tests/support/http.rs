use std::net::SocketAddr;

use axum::Router;
use cryptic_daemon::server;
use cryptic_daemon::shutdown::ShutdownController;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 実ポートにバインドしたテスト用サーバー
pub struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownController,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    /// サーバーがバインドしているアドレスを返す
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `path` へのURLを返す
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// サーバーを停止し、バックグラウンドタスクの終了を待つ
    pub async fn stop(self) {
        self.shutdown.request_shutdown();
        let _ = self.handle.await;
    }
}

/// ルーターを実ポートにバインドして起動する
pub async fn spawn_daemon(router: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownController::default();
    let handle = tokio::spawn(server::run(router, listener, shutdown.clone()));
    TestServer {
        addr,
        shutdown,
        handle,
    }
}
