//! 組み込みのエンドポイントコレクション

/// カウンター（テスト用）
pub mod counter;

/// デバイス情報
pub mod device;

use crate::registry::EndpointCollection;
use cryptic_daemon_common::error::ConfigurationError;

/// 登録順の全コレクション
pub fn collections() -> Result<Vec<EndpointCollection>, ConfigurationError> {
    Ok(vec![counter::collection()?, device::collection()?])
}
