//! 通信プロトコル定義
//!
//! `/daemon/endpoints` のレスポンス型、エラーボディ、デモエンドポイントのレスポンス型

use serde::{Deserialize, Serialize};

/// エンドポイントパラメータの記述
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterDescription {
    /// パラメータ名
    pub id: String,
    /// 説明（docstringの `:param` 行）
    pub description: String,
    /// 必須かどうか
    pub required: bool,
}

/// エンドポイントの記述
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointDescription {
    /// エンドポイント名
    pub id: String,
    /// 説明（docstringの最初の段落）
    pub description: String,
    /// 無効化されているか
    #[serde(default)]
    pub disabled: bool,
    /// 呼び出し側が指定するパラメータ（`user_id` は含まない）
    pub parameters: Vec<ParameterDescription>,
}

/// エンドポイントコレクションの記述
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionDescription {
    /// コレクション名
    pub id: String,
    /// 説明
    pub description: String,
    /// 無効化されているか
    #[serde(default)]
    pub disabled: bool,
    /// エンドポイント一覧
    pub endpoints: Vec<EndpointDescription>,
}

/// 422レスポンスの `detail` 要素
///
/// # Example
///
/// ```json
/// {"loc": ["body", "value"], "msg": "field required", "type": "value_error.missing"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// 問題の位置（例: `["body", "value"]`）
    pub loc: Vec<String>,
    /// 人間向けメッセージ
    pub msg: String,
    /// 機械向けの分類
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    /// 新しい検証エラー要素を作成
    pub fn new<I, S>(loc: I, msg: impl Into<String>, kind: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// リクエストボディ内のフィールドを指す検証エラー要素を作成
    pub fn body_field(field: &str, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(["body", field], msg, kind)
    }
}

/// カウンター値レスポンス
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueResponse {
    /// 現在の値
    pub value: i64,
}

/// カウンター値変更レスポンス
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueChangedResponse {
    /// 変更前の値（新規作成時は `null`）
    pub old: Option<i64>,
    /// 変更後の値
    pub new: i64,
}

/// 汎用OKレスポンス
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OkResponse {
    /// 常に `true`
    pub ok: bool,
}

impl OkResponse {
    /// `{"ok": true}`
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}
