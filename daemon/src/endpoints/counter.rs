//! カウンターエンドポイント（テスト用）
//!
//! 呼び出し元ユーザーごとに整数カウンターを1つ持つ。デバッグモードでのみ公開される。

use crate::api::error::{ApiError, HandlerError};
use crate::db::counter;
use crate::registry::{EndpointCollection, NoParams, ParamType, Parameters, RequestContext, Signature};
use axum::http::StatusCode;
use cryptic_daemon_common::error::ConfigurationError;
use cryptic_daemon_common::protocol::{OkResponse, ValueChangedResponse, ValueResponse};
use serde::Deserialize;

/// `set` のパスワード
const PASSWORD: &str = "S3cr3t";

/// カウンターのドメイン例外
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CounterError {
    /// カウンターが存在しない
    #[error("The counter for this user could not be found.")]
    NotFound,
    /// パスワード不一致
    #[error("The password is not correct.")]
    WrongPassword,
}

impl From<CounterError> for ApiError {
    fn from(err: CounterError) -> Self {
        let (status, code) = match err {
            CounterError::NotFound => (StatusCode::NOT_FOUND, "counter_not_found"),
            CounterError::WrongPassword => (StatusCode::UNAUTHORIZED, "wrong_password"),
        };
        ApiError::new(status, code, err.to_string())
    }
}

impl From<CounterError> for HandlerError {
    fn from(err: CounterError) -> Self {
        HandlerError::Api(err.into())
    }
}

#[derive(Debug, Deserialize)]
struct UserParams {
    user_id: String,
}

impl Parameters for UserParams {
    fn signature() -> Signature {
        Signature::new().user_id()
    }
}

#[derive(Debug, Deserialize)]
struct SetParams {
    user_id: String,
    password: String,
    value: i64,
}

impl Parameters for SetParams {
    fn signature() -> Signature {
        Signature::new()
            .param("password", ParamType::String)
            .param("value", ParamType::Integer)
            .user_id()
    }
}

/// `counter` コレクションを作成
pub fn collection() -> Result<EndpointCollection, ConfigurationError> {
    let mut collection = EndpointCollection::new("counter", "test endpoints")?.test();

    collection.register_endpoint(
        "exception",
        "Raises an exception\n\n:return: nothing",
        exception,
    )?;

    collection
        .endpoint(
            "get",
            "Fetch the current counter value

            :param user_id: id of the user
            :return: the current counter value",
        )
        .errors([ApiError::from(CounterError::NotFound)])
        .register(get)?;

    collection.register_endpoint(
        "increment",
        "Increment the counter value

        :param user_id: id of the user
        :return: the old and the new counter value",
        increment,
    )?;

    collection
        .endpoint(
            "reset",
            "Reset the counter using magic

            :param user_id: id of the user
            :return: ok",
        )
        .errors([ApiError::from(CounterError::NotFound)])
        .register(reset)?;

    collection
        .endpoint(
            "set",
            "Set the counter to a specific value

            :param user_id: id of the user
            :param password: secret password
            :param value: new counter value
            :return: the old and the new counter value",
        )
        .errors([ApiError::from(CounterError::WrongPassword)])
        .register(set)?;

    Ok(collection)
}

async fn exception(_ctx: RequestContext, _: NoParams) -> Result<i64, HandlerError> {
    let zero = 0_i64;
    1_i64
        .checked_div(zero)
        .ok_or_else(|| HandlerError::Internal("attempt to divide by zero".into()))
}

async fn get(ctx: RequestContext, params: UserParams) -> Result<ValueResponse, HandlerError> {
    let mut conn = ctx.session().connection().await?;
    let value = counter::find(&mut conn, &params.user_id)
        .await?
        .ok_or(CounterError::NotFound)?;
    Ok(ValueResponse { value })
}

async fn increment(
    ctx: RequestContext,
    params: UserParams,
) -> Result<ValueChangedResponse, HandlerError> {
    let mut conn = ctx.session().connection().await?;
    let old = counter::find(&mut conn, &params.user_id).await?;
    let new = old.map_or(1, |value| value.saturating_add(1));
    counter::store(&mut conn, &params.user_id, new).await?;
    Ok(ValueChangedResponse { old, new })
}

async fn reset(ctx: RequestContext, params: UserParams) -> Result<OkResponse, HandlerError> {
    let mut conn = ctx.session().connection().await?;
    if !counter::delete(&mut conn, &params.user_id).await? {
        return Err(CounterError::NotFound.into());
    }
    Ok(OkResponse::ok())
}

async fn set(ctx: RequestContext, params: SetParams) -> Result<ValueChangedResponse, HandlerError> {
    if params.password != PASSWORD {
        return Err(CounterError::WrongPassword.into());
    }
    let mut conn = ctx.session().connection().await?;
    let old = counter::store(&mut conn, &params.user_id, params.value).await?;
    Ok(ValueChangedResponse {
        old,
        new: params.value,
    })
}
