//! デーモンの停止要求
//!
//! [`crate::server::run`] はCtrl+C・SIGTERMに加えてこの要求でも新規接続の受け付けを止め、
//! 処理中のリクエスト（とそのセッション）が閉じるのを待ってから戻る。
//! 統合テストでは一時ポートで起動したデーモンを止めるのに使う。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// 停止要求のハンドル（クローンは同じ要求を共有する）
#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    state: Arc<StopState>,
}

#[derive(Debug, Default)]
struct StopState {
    stopping: AtomicBool,
    waiters: Notify,
}

impl ShutdownController {
    /// 停止が要求済みか
    pub fn is_shutdown_requested(&self) -> bool {
        self.state.stopping.load(Ordering::SeqCst)
    }

    /// 停止を要求し、待機中の全タスクを起こす
    pub fn request_shutdown(&self) {
        self.state.stopping.store(true, Ordering::SeqCst);
        self.state.waiters.notify_waiters();
    }

    /// 停止が要求されるまで待つ
    pub async fn wait(&self) {
        let notified = self.state.waiters.notified();
        tokio::pin!(notified);
        // フラグを見る前に登録しておかないと、間に入った要求を取りこぼす
        notified.as_mut().enable();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }
}
