//! ファイルDB上での同時リクエストの統合テスト

use crate::support::daemon::{test_config, TestDaemon, TOKEN};
use axum::http::StatusCode;
use cryptic_daemon::{bootstrap, endpoints};
use cryptic_daemon_common::config::DaemonConfig;
use futures::future::join_all;
use serde_json::json;

const USERS: [&str; 4] = [
    "11111111-1111-4111-8111-111111111111",
    "22222222-2222-4222-8222-222222222222",
    "33333333-3333-4333-8333-333333333333",
    "44444444-4444-4444-8444-444444444444",
];

const PER_USER: usize = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let config = DaemonConfig {
        database_url: format!("sqlite://{}", dir.path().join("daemon.db").display()),
        sql_create_tables: true,
        ..test_config()
    };
    let sessions = bootstrap::prepare_database(&config).await.unwrap();
    let daemon = TestDaemon::with_sessions(
        config,
        sessions,
        endpoints::collections().unwrap(),
    );

    let client = &daemon;
    let requests = USERS.iter().flat_map(|&user| {
        (0..PER_USER).map(move |_| {
            client.post_as("/counter/increment", Some(TOKEN), Some(user), json!({}))
        })
    });
    let responses = join_all(requests).await;

    let failures: Vec<_> = responses
        .iter()
        .filter(|(status, _)| *status != StatusCode::OK)
        .collect();
    assert!(failures.is_empty(), "failed responses: {failures:?}");

    for user in USERS {
        let (status, body) = daemon
            .post_as("/counter/get", Some(TOKEN), Some(user), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"value": PER_USER}));
    }

    let total: i64 = sqlx::query_scalar("SELECT SUM(value) FROM counter")
        .fetch_one(daemon.sessions.pool())
        .await
        .unwrap();
    assert_eq!(total, (USERS.len() * PER_USER) as i64);
    daemon.assert_sessions_balanced();
}
