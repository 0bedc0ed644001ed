//! 実ソケット越しのスモークテスト

use crate::support::daemon::{test_config, TestDaemon, TOKEN, USER};
use crate::support::http::spawn_daemon;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn serves_requests_over_tcp_and_shuts_down() {
    let daemon = TestDaemon::new(test_config()).await;
    let server = spawn_daemon(daemon.router.clone()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/device/info"))
        .bearer_auth(TOKEN)
        .header("x-user-id", USER)
        .json(&json!({"foo": "bar", "bar": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["bar"], 3);

    let response = client
        .get(server.url("/daemon/endpoints"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let addr = server.addr();
    server.stop().await;
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
