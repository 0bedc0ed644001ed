//! ユーザーごとのカウンター値の永続化

use cryptic_daemon_common::error::{DaemonError, DaemonResult};
use sqlx::SqliteConnection;

/// カウンター値を取得する（存在しなければ `None`）
pub async fn find(conn: &mut SqliteConnection, user_id: &str) -> DaemonResult<Option<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT value FROM counter WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DaemonError::Database(format!("Failed to load counter: {}", e)))
}

/// カウンター値を書き込み、変更前の値を返す
pub async fn store(
    conn: &mut SqliteConnection,
    user_id: &str,
    value: i64,
) -> DaemonResult<Option<i64>> {
    let old = find(conn, user_id).await?;
    sqlx::query(
        r#"
        INSERT INTO counter (user_id, value) VALUES (?, ?)
        ON CONFLICT(user_id) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(user_id)
    .bind(value)
    .execute(&mut *conn)
    .await
    .map_err(|e| DaemonError::Database(format!("Failed to store counter: {}", e)))?;
    Ok(old)
}

/// カウンターを削除する。削除した場合 `true`
pub async fn delete(conn: &mut SqliteConnection, user_id: &str) -> DaemonResult<bool> {
    let result = sqlx::query("DELETE FROM counter WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DaemonError::Database(format!("Failed to delete counter: {}", e)))?;
    Ok(result.rows_affected() > 0)
}
