//! エンドポイントのdocstring解析
//!
//! ```text
//! Set the counter to a specific value
//!
//! :param password: secret password
//! :param value: new counter value
//! :return: the old and the new counter value
//! ```
//!
//! 最初のメタデータ行より前が説明文、以降は `:param` / `:return:` 行のみ。

use super::parameters::ParameterModel;
use cryptic_daemon_common::error::ConfigurationError;

const PARAM_PREFIX: &str = ":param ";
const RETURN_PREFIXES: [&str; 2] = [":returns:", ":return:"];

/// 解析済みのdocstring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointDoc {
    description: String,
    params: Vec<(String, String)>,
    returns: Option<String>,
}

impl EndpointDoc {
    /// docstringを解析する
    ///
    /// `endpoint` はエラーメッセージ用のパス（例: `/counter/set`）。
    pub fn parse(endpoint: &str, text: &str) -> Result<Self, ConfigurationError> {
        let mut paragraphs: Vec<Vec<&str>> = vec![Vec::new()];
        let mut params: Vec<(String, String)> = Vec::new();
        let mut returns = None;
        let mut in_metadata = false;

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                if paragraphs.last().is_some_and(|p| !p.is_empty()) {
                    paragraphs.push(Vec::new());
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix(PARAM_PREFIX) {
                let (name, description) = rest
                    .split_once(':')
                    .map(|(name, description)| (name.trim(), description.trim()))
                    .filter(|(name, _)| !name.is_empty())
                    .ok_or_else(|| malformed(endpoint, line))?;
                if params.iter().any(|(existing, _)| existing == name) {
                    return Err(malformed(endpoint, line));
                }
                params.push((name.to_string(), description.to_string()));
                in_metadata = true;
            } else if let Some(rest) = RETURN_PREFIXES
                .iter()
                .find_map(|prefix| line.strip_prefix(prefix))
            {
                returns = Some(rest.trim().to_string());
                in_metadata = true;
            } else if in_metadata {
                return Err(malformed(endpoint, line));
            } else if let Some(paragraph) = paragraphs.last_mut() {
                paragraph.push(line);
            }
        }

        let description = paragraphs
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        if description.is_empty() {
            return Err(ConfigurationError::MissingDescription {
                endpoint: endpoint.to_string(),
            });
        }

        Ok(Self {
            description,
            params,
            returns,
        })
    }

    /// docstringとパラメータモデルの整合性を検査する
    ///
    /// 呼び出し側が指定するパラメータはすべて `:param` で説明されていなければならず、
    /// `:param` はモデルに存在するパラメータしか指せない。
    pub fn check(&self, endpoint: &str, model: &ParameterModel) -> Result<(), ConfigurationError> {
        if let Some((name, _)) = self.params.iter().find(|(name, _)| model.get(name).is_none()) {
            return Err(ConfigurationError::UnknownParameter {
                endpoint: endpoint.to_string(),
                parameter: name.clone(),
            });
        }
        if let Some(parameter) = model.public().find(|p| self.param(p.name()).is_none()) {
            return Err(ConfigurationError::UndocumentedParameter {
                endpoint: endpoint.to_string(),
                parameter: parameter.name().to_string(),
            });
        }
        Ok(())
    }

    /// 説明文
    pub fn description(&self) -> &str {
        &self.description
    }

    /// パラメータの説明
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, description)| description.as_str())
    }

    /// 戻り値の説明
    pub fn returns(&self) -> Option<&str> {
        self.returns.as_deref()
    }

    /// Markdownに整形する
    pub fn to_markdown(&self) -> String {
        let mut out = self.description.clone();
        if !self.params.is_empty() {
            out.push_str("\n\n**Parameters:**");
            for (name, description) in &self.params {
                out.push_str(&format!("\n- **{}:** {}", name, description));
            }
        }
        if let Some(returns) = &self.returns {
            out.push_str(&format!("\n\n**Returns:** {}", returns));
        }
        out
    }
}

fn malformed(endpoint: &str, line: &str) -> ConfigurationError {
    ConfigurationError::MalformedDocs {
        endpoint: endpoint.to_string(),
        line: line.to_string(),
    }
}
