//! カウンターエンドポイントの統合テスト

use crate::support::daemon::{test_config, TestDaemon, OTHER_USER, TOKEN, USER};
use axum::http::StatusCode;
use cryptic_daemon_common::config::DaemonConfig;
use serde_json::json;

#[tokio::test]
async fn increment_then_get() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon.post("/counter/increment", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"old": null, "new": 1}));

    let (status, body) = daemon.post("/counter/increment", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"old": 1, "new": 2}));

    let (status, body) = daemon.post("/counter/get", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"value": 2}));

    daemon.assert_sessions_balanced();
}

#[tokio::test]
async fn get_unknown_counter_is_not_found() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon.post("/counter/get", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "counter_not_found"}));
}

#[tokio::test]
async fn set_requires_value() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon
        .post("/counter/set", json!({"password": "S3cr3t"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "422 Unprocessable Entity");
    assert_eq!(
        body["detail"],
        json!([{
            "loc": ["body", "value"],
            "msg": "field required",
            "type": "value_error.missing"
        }])
    );
    daemon.assert_sessions_balanced();
}

#[tokio::test]
async fn set_rejects_string_value() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon
        .post("/counter/set", json!({"password": "S3cr3t", "value": "7"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "value"]));
}

#[tokio::test]
async fn set_with_wrong_password_leaves_counter_untouched() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon
        .post("/counter/set", json!({"password": "nope", "value": 5}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "wrong_password"}));

    let (status, _) = daemon.post("/counter/get", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_then_reset() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon
        .post("/counter/set", json!({"password": "S3cr3t", "value": 41}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"old": null, "new": 41}));

    let (_, body) = daemon.post("/counter/increment", json!({})).await;
    assert_eq!(body, json!({"old": 41, "new": 42}));

    let (status, body) = daemon.post("/counter/reset", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = daemon.post("/counter/reset", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "counter_not_found"}));

    daemon.assert_sessions_balanced();
}

#[tokio::test]
async fn exception_is_internal_server_error() {
    let daemon = TestDaemon::new(test_config()).await;

    let (status, body) = daemon.post("/counter/exception", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "500 Internal Server Error"}));
    daemon.assert_sessions_balanced();
}

#[tokio::test]
async fn counters_are_per_user() {
    let daemon = TestDaemon::new(test_config()).await;

    daemon.post("/counter/increment", json!({})).await;
    daemon.post("/counter/increment", json!({})).await;

    let (status, body) = daemon
        .post_as("/counter/increment", Some(TOKEN), Some(OTHER_USER), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"old": null, "new": 1}));

    let (_, body) = daemon.post("/counter/get", json!({})).await;
    assert_eq!(body, json!({"value": 2}));
}

#[tokio::test]
async fn identity_is_case_normalised() {
    let daemon = TestDaemon::new(test_config()).await;

    daemon.post("/counter/increment", json!({})).await;
    let upper = USER.to_uppercase();
    let (status, body) = daemon
        .post_as("/counter/get", Some(TOKEN), Some(&upper), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"value": 1}));
}

#[tokio::test]
async fn counter_collection_is_hidden_outside_debug() {
    let config = DaemonConfig {
        debug: false,
        ..test_config()
    };
    let daemon = TestDaemon::new(config).await;

    let (status, body) = daemon.post("/counter/increment", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "404 Not Found"}));

    let (_, listing) = daemon.get("/daemon/endpoints", Some(TOKEN)).await;
    let ids: Vec<_> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["device"]);
}
