//! cryptic-daemon 共通型定義
//!
//! デーモン本体とツール群で共有する設定・エラー・通信プロトコル型

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// 通信プロトコル定義（エンドポイント記述・エラーボディ）
pub mod protocol;
