//! デバイスエンドポイント

use crate::api::error::HandlerError;
use crate::registry::{EndpointCollection, ParamType, Parameters, RequestContext, Signature};
use cryptic_daemon_common::error::ConfigurationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct InfoParams {
    user_id: String,
    foo: String,
    bar: i64,
    test: Option<String>,
}

impl Parameters for InfoParams {
    fn signature() -> Signature {
        Signature::new()
            .user_id()
            .param("foo", ParamType::String)
            .param("bar", ParamType::Integer)
            .optional("test", ParamType::String)
    }
}

/// `info` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    /// 呼び出し元ID
    pub user_id: String,
    /// 受け取った `foo`
    pub foo: String,
    /// `bar + 2`
    pub bar: i64,
    /// 受け取った `test`
    pub test: Option<String>,
}

/// `device` コレクションを作成
pub fn collection() -> Result<EndpointCollection, ConfigurationError> {
    let mut collection = EndpointCollection::new("device", "some device endpoints")?;
    collection.register_endpoint(
        "info",
        "Test endpoint

        :param user_id: id of the user
        :param foo: xy
        :param bar: hello world
        :param test: asdofjaoisdfjoi
        :return: test",
        info,
    )?;
    Ok(collection)
}

async fn info(_ctx: RequestContext, params: InfoParams) -> Result<InfoResponse, HandlerError> {
    Ok(InfoResponse {
        user_id: params.user_id,
        foo: params.foo,
        bar: params.bar.saturating_add(2),
        test: params.test,
    })
}
