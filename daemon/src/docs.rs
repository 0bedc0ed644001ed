//! エンドポイントドキュメント生成
//!
//! コレクションごとに1つのMarkdownファイル（`<collection>.md`）を書き出す。

use crate::registry::{Endpoint, EndpointCollection};
use cryptic_daemon_common::error::ConfigurationError;
use std::path::{Path, PathBuf};

/// ドキュメント生成エラー
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// docstringが不正
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// ファイル書き込み失敗
    #[error("failed to write {path}: {source}")]
    Io {
        /// 対象パス
        path: PathBuf,
        /// 原因
        #[source]
        source: std::io::Error,
    },
}

/// コレクションをMarkdownに整形する
pub fn render_collection(collection: &EndpointCollection) -> Result<String, ConfigurationError> {
    let mut out = String::new();
    out.push_str(&format!("# {} Endpoints\n\n", capitalize(collection.name())));
    out.push_str(&format!("{}\n\n", collection.description()));
    if collection.is_test() {
        out.push_str("> Only available when the daemon runs in debug mode.\n\n");
    }

    for endpoint in collection.endpoints() {
        render_endpoint(&mut out, endpoint)?;
    }

    Ok(out.trim_end().to_string() + "\n")
}

fn render_endpoint(out: &mut String, endpoint: &Endpoint) -> Result<(), ConfigurationError> {
    let doc = endpoint.doc()?;

    out.push_str(&format!("## `{}`\n\n", endpoint.name()));
    out.push_str(&format!("**Path:** `POST {}`\n\n", endpoint.path()));
    if endpoint.is_disabled() {
        out.push_str("> This endpoint is disabled.\n\n");
    } else if endpoint.is_test() {
        out.push_str("> Only available when the daemon runs in debug mode.\n\n");
    }
    out.push_str(&format!("{}\n\n", doc.to_markdown()));

    if !endpoint.errors().is_empty() {
        out.push_str("**Errors:**\n\n");
        out.push_str("| Status | Error | Description | Example |\n");
        out.push_str("|---|---|---|---|\n");
        let mut errors: Vec<_> = endpoint.errors().iter().collect();
        errors.sort_by_key(|e| e.status().as_u16());
        for error in errors {
            out.push_str(&format!(
                "| {} {} | `{}` | {} | `{}` |\n",
                error.status().as_u16(),
                error.status().canonical_reason().unwrap_or(""),
                error.code(),
                error.description(),
                error.to_json()
            ));
        }
        out.push('\n');
    }
    Ok(())
}

/// 全コレクションのドキュメントを `directory` に書き出す
pub fn write_docs<'a>(
    collections: impl IntoIterator<Item = &'a EndpointCollection>,
    directory: &Path,
) -> Result<Vec<PathBuf>, DocsError> {
    let mut written = Vec::new();
    for collection in collections {
        let path = directory.join(format!("{}.md", collection.name()));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DocsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        tracing::info!(collection = %collection.name(), path = %path.display(), "writing endpoint docs");
        let markdown = render_collection(collection)?;
        std::fs::write(&path, markdown).map_err(|source| DocsError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
