//! ディスパッチャの統合テスト（ドメインエラー、パニック、セッションの開閉）

use crate::support::daemon::{test_config, TestDaemon, TOKEN, USER};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cryptic_daemon::api::error::{ApiError, HandlerError};
use cryptic_daemon::db::counter;
use cryptic_daemon::registry::{
    EndpointCollection, NoParams, ParamType, Parameters, RequestContext, Signature,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct StoreParams {
    user_id: String,
    value: i64,
}

impl Parameters for StoreParams {
    fn signature() -> Signature {
        Signature::new()
            .user_id()
            .param("value", ParamType::Integer)
    }
}

async fn lookup(_ctx: RequestContext, _: NoParams) -> Result<(), HandlerError> {
    Err(ApiError::new(StatusCode::NOT_FOUND, "not_found", "Nothing here.")
        .with("item", "x")
        .into())
}

async fn explode(_ctx: RequestContext, _: NoParams) -> Result<(), HandlerError> {
    panic!("handler exploded")
}

async fn store_then_refuse(
    ctx: RequestContext,
    params: StoreParams,
) -> Result<(), HandlerError> {
    let mut conn = ctx.session().connection().await?;
    counter::store(&mut conn, &params.user_id, params.value).await?;
    Err(ApiError::new(StatusCode::CONFLICT, "refused", "Stored but refused.").into())
}

fn lab_collection() -> EndpointCollection {
    let mut collection = EndpointCollection::new("lab", "experimental endpoints").unwrap();
    collection
        .register_endpoint("lookup", "Look something up\n\n:return: nothing", lookup)
        .unwrap();
    collection
        .register_endpoint("explode", "Panics\n\n:return: nothing", explode)
        .unwrap();
    collection
        .register_endpoint(
            "store",
            "Store a counter value and refuse

            :param user_id: id of the user
            :param value: value to store",
            store_then_refuse,
        )
        .unwrap();
    collection
}

async fn lab_daemon() -> TestDaemon {
    TestDaemon::with_collections(test_config(), vec![lab_collection()]).await
}

#[tokio::test]
async fn domain_error_carries_code_and_extra_fields() {
    let daemon = lab_daemon().await;

    let (status, body) = daemon.post("/lab/lookup", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "not_found", "item": "x"}));
    daemon.assert_sessions_balanced();
}

#[tokio::test]
async fn panicking_handler_is_internal_server_error() {
    let daemon = lab_daemon().await;

    let (status, body) = daemon.post("/lab/explode", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "500 Internal Server Error"}));
    daemon.assert_sessions_balanced();

    // パニック後もサーバーは応答し続ける
    let (status, _) = daemon.post("/lab/lookup", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_is_committed_on_domain_error() {
    let daemon = lab_daemon().await;

    let (status, body) = daemon.post("/lab/store", json!({"value": 9})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "refused"}));
    daemon.assert_sessions_balanced();

    let mut conn = daemon.sessions.pool().acquire().await.unwrap();
    assert_eq!(counter::find(&mut conn, USER).await.unwrap(), Some(9));
}

#[tokio::test]
async fn every_path_releases_its_session() {
    let daemon = lab_daemon().await;

    daemon.post("/lab/lookup", json!({})).await;
    daemon.post("/lab/explode", json!({})).await;
    daemon.post("/lab/store", json!({"value": "nine"})).await;
    daemon.post("/lab/store", json!({"value": 1})).await;
    daemon
        .post_as("/lab/store", Some(TOKEN), None, json!({"value": 1}))
        .await;

    assert_eq!(daemon.sessions.opened(), 5);
    daemon.assert_sessions_balanced();
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let daemon = lab_daemon().await;

    let (status, body) = daemon.post("/lab/missing", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "404 Not Found"}));

    let (status, _) = daemon.post("/device/info", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(daemon.sessions.opened(), 0);
}

#[tokio::test]
async fn wrong_method_is_not_allowed() {
    let daemon = lab_daemon().await;

    let request = Request::builder()
        .method("GET")
        .uri("/lab/lookup")
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, body) = daemon.send(request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "405 Method Not Allowed"}));

    let request = Request::builder()
        .method("POST")
        .uri("/daemon/endpoints")
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, _) = daemon.send(request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn oversized_body_gets_json_error() {
    let daemon = TestDaemon::new(test_config()).await;

    let body = format!(
        "{{\"foo\": \"{}\", \"bar\": 1}}",
        "x".repeat(3 * 1024 * 1024)
    );
    let (status, body) = daemon
        .post_raw("/device/info", Some(TOKEN), Some(USER), body)
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"error": "413 Payload Too Large"}));
    assert_eq!(daemon.sessions.opened(), 0);
}
