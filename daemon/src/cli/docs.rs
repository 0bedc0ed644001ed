//! docs サブコマンド
//!
//! エンドポイントのMarkdownドキュメントを生成します。

use clap::Args;
use std::path::PathBuf;

/// docs サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct DocsArgs {
    /// Output directory
    #[arg(short, long, default_value = "docs/endpoints")]
    pub output: PathBuf,
}
