//! 統合テスト用ユーティリティ

#![allow(dead_code)]

pub mod daemon;
pub mod http;
