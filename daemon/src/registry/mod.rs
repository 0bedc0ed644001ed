//! エンドポイント登録フレームワーク
//!
//! ハンドラを一度宣言すると、パラメータの検証、`POST /{collection}/{endpoint}`
//! へのルーティング（認可ゲート付き）、`/daemon/endpoints` 向けの記述、
//! エラーのJSON変換とリクエストスコープのDBセッションが自動で付く。

/// エンドポイントコレクション
pub mod collection;

/// docstring解析
pub mod doc;

/// 登録済みエンドポイント
pub mod endpoint;

/// パラメータモデル
pub mod parameters;

pub use collection::{EndpointBuilder, EndpointCollection};
pub use endpoint::{Endpoint, RequestContext};
pub use parameters::{NoParams, ParamType, Parameters, Signature};
