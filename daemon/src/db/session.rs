//! リクエストスコープのデータベースセッション
//!
//! 1リクエストにつき1つのトランザクションを開き、どの経路で終了しても
//! 必ず1回だけ解放する。正常終了時は [`SessionScope::close`] でコミットし、
//! リクエストがキャンセルされた場合は `Drop` でロールバックする。

use cryptic_daemon_common::error::{DaemonError, DaemonResult};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use uuid::Uuid;

const BEGIN_SESSION: &str = "BEGIN IMMEDIATE";

#[derive(Debug, Default)]
struct SessionStats {
    opened: AtomicU64,
    released: AtomicU64,
}

/// セッションを払い出す共有プール
#[derive(Debug, Clone)]
pub struct SessionPool {
    pool: SqlitePool,
    stats: Arc<SessionStats>,
}

impl SessionPool {
    /// SQLiteプールをラップする
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// 内部のSQLiteプール
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// トランザクションを開始し、リクエストスコープを返す
    ///
    /// 読み取り後に書き込むハンドラがロック昇格で `SQLITE_BUSY` にならないよう、
    /// 書き込みロックを最初に取る（`BEGIN IMMEDIATE`）。競合時は接続の
    /// `busy_timeout` まで待つ。
    pub async fn open(&self) -> DaemonResult<SessionScope> {
        let tx = self
            .pool
            .begin_with(BEGIN_SESSION)
            .await
            .map_err(|e| DaemonError::Database(format!("Failed to open session: {}", e)))?;
        self.stats.opened.fetch_add(1, Ordering::SeqCst);

        let session = Session {
            id: Uuid::new_v4(),
            inner: Arc::new(Mutex::new(Some(tx))),
        };
        tracing::trace!(session_id = %session.id, "session opened");

        Ok(SessionScope {
            session,
            stats: self.stats.clone(),
            released: false,
        })
    }

    /// これまでに開かれたセッション数
    pub fn opened(&self) -> u64 {
        self.stats.opened.load(Ordering::SeqCst)
    }

    /// これまでに解放されたセッション数
    pub fn released(&self) -> u64 {
        self.stats.released.load(Ordering::SeqCst)
    }

    /// 現在開いているセッション数
    pub fn active(&self) -> u64 {
        self.opened().saturating_sub(self.released())
    }
}

/// ハンドラに渡されるセッションハンドル
///
/// クローンは同じトランザクションを共有する。スコープが閉じた後に
/// [`Session::connection`] を呼ぶと [`DaemonError::SessionClosed`] になる。
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    inner: Arc<Mutex<Option<Transaction<'static, Sqlite>>>>,
}

impl Session {
    /// セッションID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// トランザクション上の接続を借用する
    pub async fn connection(&self) -> DaemonResult<SessionConnection<'_>> {
        let guard = self.inner.lock().await;
        MutexGuard::try_map(guard, Option::as_mut)
            .map(SessionConnection)
            .map_err(|_| DaemonError::SessionClosed(self.id))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

/// 借用中のトランザクション接続
pub struct SessionConnection<'a>(MappedMutexGuard<'a, Transaction<'static, Sqlite>>);

impl Deref for SessionConnection<'_> {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SessionConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// リクエストの生存期間に束縛されたセッション
pub struct SessionScope {
    session: Session,
    stats: Arc<SessionStats>,
    released: bool,
}

impl SessionScope {
    /// ハンドラに渡すハンドルを取得
    pub fn session(&self) -> Session {
        self.session.clone()
    }

    /// コミットして接続をプールへ返す
    ///
    /// コミットに失敗しても解放済みとして数える。
    pub async fn close(mut self) -> DaemonResult<()> {
        let tx = self.session.inner.lock().await.take();
        self.mark_released();

        match tx {
            Some(tx) => tx.commit().await.map_err(|e| {
                DaemonError::Database(format!(
                    "Failed to commit session {}: {}",
                    self.session.id, e
                ))
            }),
            None => Ok(()),
        }
    }

    fn mark_released(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.released.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(session_id = %self.session.id, "session released");
        }
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // ロック中なら最後のハンドルが落ちた時点でロールバックされる
        if let Ok(mut guard) = self.session.inner.try_lock() {
            drop(guard.take());
        }
        tracing::warn!(
            session_id = %self.session.id,
            "session dropped before completion, rolling back"
        );
        self.mark_released();
    }
}
