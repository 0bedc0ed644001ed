//! 認可ゲートと呼び出し元IDの統合テスト

use crate::support::daemon::{test_config, TestDaemon, TOKEN, USER};
use axum::http::StatusCode;
use cryptic_daemon_common::config::DaemonConfig;
use serde_json::json;

fn info_body() -> serde_json::Value {
    json!({"foo": "x", "bar": 1})
}

#[tokio::test]
async fn valid_token_passes_the_gate() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, _) = daemon.post("/device/info", info_body()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = daemon.get("/daemon/endpoints", Some(TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_or_missing_token_is_forbidden_without_opening_a_session() {
    let daemon = TestDaemon::new(test_config()).await;

    for token in [Some("T2"), None] {
        let (status, body) = daemon
            .post_as("/device/info", token, Some(USER), info_body())
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"error": "403 Forbidden"}));

        let (status, body) = daemon.get("/daemon/endpoints", token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"error": "403 Forbidden"}));
    }

    assert_eq!(daemon.sessions.opened(), 0);
}

#[tokio::test]
async fn without_configured_token_everything_passes() {
    let config = DaemonConfig {
        debug: true,
        ..Default::default()
    };
    let daemon = TestDaemon::new(config).await;

    let (status, _) = daemon
        .post_as("/device/info", None, Some(USER), info_body())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = daemon
        .post_as("/device/info", Some("anything"), Some(USER), info_body())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = daemon.get("/daemon/endpoints", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon
        .post_as("/device/info", Some(TOKEN), None, info_body())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "401 Unauthorized"}));
    daemon.assert_sessions_balanced();
}

#[tokio::test]
async fn malformed_identity_is_a_validation_error() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon
        .post_as("/device/info", Some(TOKEN), Some("alice"), info_body())
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "422 Unprocessable Entity");
    assert_eq!(body["detail"][0]["loc"], json!(["header", "x-user-id"]));
}

#[tokio::test]
async fn identity_in_body_is_ignored() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon
        .post(
            "/device/info",
            json!({"foo": "x", "bar": 1, "user_id": "someone-else"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], USER);
}
