//! パラメータモデル
//!
//! ハンドラのパラメータ型が宣言する [`Signature`] から、順序付きの
//! [`ParameterModel`] を一度だけ構築する。リクエスト時はこのモデルで
//! JSONボディを検証し、呼び出し元IDを `user_id` として注入する。

use cryptic_daemon_common::error::ConfigurationError;
use cryptic_daemon_common::protocol::ValidationIssue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 認証層から注入される予約パラメータ名
pub const USER_ID: &str = "user_id";

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex")
});

/// パラメータの型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// JSON文字列
    String,
    /// 64bit整数に収まるJSON数値
    Integer,
    /// 任意のJSON数値
    Float,
    /// JSON真偽値
    Boolean,
    /// UUID形式の文字列
    Uuid,
    /// JSONオブジェクト
    Object,
    /// JSON配列
    Array,
    /// 任意の値（`null` を含む）
    Any,
}

impl ParamType {
    /// 型名
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Uuid => "uuid",
            Self::Object => "object",
            Self::Array => "array",
            Self::Any => "any",
        }
    }

    /// 値がこの型に合致するか
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Any => true,
        }
    }

    fn mismatch(self) -> (&'static str, &'static str) {
        match self {
            Self::String => ("str type expected", "type_error.str"),
            Self::Integer => ("value is not a valid integer", "type_error.integer"),
            Self::Float => ("value is not a valid float", "type_error.float"),
            Self::Boolean => ("value could not be parsed to a boolean", "type_error.bool"),
            Self::Uuid => ("value is not a valid uuid", "type_error.uuid"),
            Self::Object => ("value is not a valid dict", "type_error.dict"),
            Self::Array => ("value is not a valid list", "type_error.list"),
            Self::Any => ("", ""),
        }
    }

    /// この型が受け付ける代表値
    fn sample(self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Integer => Value::from(0_i64),
            Self::Float => Value::from(0.0_f64),
            Self::Boolean => Value::Bool(false),
            Self::Uuid => Value::String(uuid::Uuid::nil().hyphenated().to_string()),
            Self::Object => Value::Object(Map::new()),
            Self::Array => Value::Array(Vec::new()),
            Self::Any => Value::Null,
        }
    }
}

/// パラメータの型注釈
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// 必須
    Required(ParamType),
    /// 省略可能（既定値 `null`）
    Optional(ParamType),
}

/// ハンドラが受け取るパラメータの宣言（宣言順を保持）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    entries: Vec<(String, Annotation)>,
}

impl Signature {
    /// 空のシグネチャ
    pub fn new() -> Self {
        Self::default()
    }

    /// 任意の注釈でパラメータを追加
    pub fn annotate(mut self, name: impl Into<String>, annotation: Annotation) -> Self {
        self.entries.push((name.into(), annotation));
        self
    }

    /// 必須パラメータを追加
    pub fn param(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.annotate(name, Annotation::Required(ty))
    }

    /// 省略可能パラメータを追加
    pub fn optional(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.annotate(name, Annotation::Optional(ty))
    }

    /// 呼び出し元ID（`user_id`）を受け取る
    pub fn user_id(self) -> Self {
        self.param(USER_ID, ParamType::String)
    }

    /// 宣言されたパラメータ
    pub fn entries(&self) -> &[(String, Annotation)] {
        &self.entries
    }
}

/// ハンドラのパラメータ型
///
/// `Deserialize` で検証済みボディから組み立てられ、[`Parameters::signature`]
/// がパラメータモデルの元になる。
///
/// ```
/// use cryptic_daemon::registry::parameters::{ParamType, Parameters, Signature};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct SetParams {
///     user_id: String,
///     value: i64,
///     password: Option<String>,
/// }
///
/// impl Parameters for SetParams {
///     fn signature() -> Signature {
///         Signature::new()
///             .user_id()
///             .param("value", ParamType::Integer)
///             .optional("password", ParamType::String)
///     }
/// }
/// ```
pub trait Parameters: DeserializeOwned + Send + 'static {
    /// パラメータの宣言
    fn signature() -> Signature;
}

/// パラメータを取らないハンドラ用
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NoParams {}

impl Parameters for NoParams {
    fn signature() -> Signature {
        Signature::new()
    }
}

/// モデル内の1パラメータ
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    ty: ParamType,
    required: bool,
    default: Option<Value>,
}

impl Parameter {
    /// パラメータ名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 型
    pub fn ty(&self) -> ParamType {
        self.ty
    }

    /// 必須か
    pub fn required(&self) -> bool {
        self.required
    }

    /// 既定値（省略可能なら `Some(null)`）
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// 認証層から注入されるパラメータか
    pub fn is_injected(&self) -> bool {
        self.name == USER_ID
    }
}

/// 順序付きのパラメータモデル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterModel {
    parameters: Vec<Parameter>,
}

impl ParameterModel {
    /// シグネチャからモデルを構築する
    pub fn build(signature: &Signature) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        let mut parameters = Vec::with_capacity(signature.entries().len());

        for (name, annotation) in signature.entries() {
            if !IDENTIFIER.is_match(name) {
                return Err(ConfigurationError::InvalidParameterName {
                    parameter: name.clone(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigurationError::DuplicateParameter {
                    parameter: name.clone(),
                });
            }
            let (ty, required) = match *annotation {
                Annotation::Required(ty) => (ty, true),
                Annotation::Optional(ty) => (ty, false),
            };
            if name == USER_ID && !required {
                return Err(ConfigurationError::OptionalIdentity {
                    parameter: name.clone(),
                });
            }
            parameters.push(Parameter {
                name: name.clone(),
                ty,
                required,
                default: (!required).then_some(Value::Null),
            });
        }

        Ok(Self { parameters })
    }

    /// 全パラメータ（`user_id` を含む）
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// 呼び出し側が指定するパラメータ
    pub fn public(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| !p.is_injected())
    }

    /// 名前でパラメータを引く
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// 呼び出し元IDを必要とするか
    pub fn requires_identity(&self) -> bool {
        self.parameters.iter().any(Parameter::is_injected)
    }

    /// ハンドラのパラメータ型 `P` がこのモデルと一致するか検査する
    ///
    /// 代表値で埋めた引数から `P` を組み立てられること、必須パラメータを
    /// `null` にすると組み立てられないことを確かめる。省略可能なのは
    /// `P` 側のフィールドが `null` を受け付ける場合に限る。
    pub fn check_type<P: Parameters>(&self, endpoint: &str) -> Result<(), ConfigurationError> {
        let mismatch = |message: String| ConfigurationError::SignatureMismatch {
            endpoint: endpoint.to_string(),
            message,
        };

        let sample: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                let value = if p.required { p.ty.sample() } else { Value::Null };
                (p.name.clone(), value)
            })
            .collect();
        serde_json::from_value::<P>(Value::Object(sample.clone()))
            .map_err(|e| mismatch(e.to_string()))?;

        for parameter in self
            .parameters
            .iter()
            .filter(|p| p.required && p.ty != ParamType::Any)
        {
            let mut arguments = sample.clone();
            arguments.insert(parameter.name.clone(), Value::Null);
            if serde_json::from_value::<P>(Value::Object(arguments)).is_ok() {
                return Err(mismatch(format!(
                    "parameter {:?} is declared required but its field accepts null",
                    parameter.name
                )));
            }
        }
        Ok(())
    }

    /// ボディを検証し、ハンドラへ渡す引数オブジェクトを組み立てる
    ///
    /// 未知のフィールドは捨てる。省略可能なパラメータの欠落・`null` は `null` で埋める。
    /// `identity` は `user_id` として注入され、ボディ側の値より優先される。
    pub fn validate(
        &self,
        body: Value,
        identity: Option<&str>,
    ) -> Result<Map<String, Value>, Vec<ValidationIssue>> {
        let Value::Object(mut body) = body else {
            return Err(vec![ValidationIssue::new(
                ["body"],
                "value is not a valid dict",
                "type_error.dict",
            )]);
        };

        let mut issues = Vec::new();
        let mut arguments = Map::new();

        for parameter in &self.parameters {
            if parameter.is_injected() {
                match identity {
                    Some(id) => {
                        arguments.insert(parameter.name.clone(), Value::String(id.to_string()));
                    }
                    None => issues.push(ValidationIssue::new(
                        ["header", crate::auth::identity::USER_ID_HEADER],
                        "field required",
                        "value_error.missing",
                    )),
                }
                continue;
            }

            match body.remove(&parameter.name) {
                None if parameter.required => issues.push(ValidationIssue::body_field(
                    &parameter.name,
                    "field required",
                    "value_error.missing",
                )),
                Some(Value::Null) if parameter.required && parameter.ty != ParamType::Any => {
                    issues.push(ValidationIssue::body_field(
                        &parameter.name,
                        "none is not an allowed value",
                        "type_error.none.not_allowed",
                    ))
                }
                None | Some(Value::Null) => {
                    arguments.insert(parameter.name.clone(), Value::Null);
                }
                Some(value) if parameter.ty.accepts(&value) => {
                    arguments.insert(parameter.name.clone(), value);
                }
                Some(_) => {
                    let (msg, kind) = parameter.ty.mismatch();
                    issues.push(ValidationIssue::body_field(&parameter.name, msg, kind));
                }
            }
        }

        if issues.is_empty() {
            Ok(arguments)
        } else {
            Err(issues)
        }
    }
}

/// リクエストボディをJSONとして読む（空ボディは `{}`）
pub fn parse_body(bytes: &[u8]) -> Result<Value, Vec<ValidationIssue>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        vec![ValidationIssue::new(
            ["body".to_string(), e.column().to_string()],
            e.to_string(),
            "value_error.jsondecode",
        )]
    })
}
