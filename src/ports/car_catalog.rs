use crate::domain::value_objects::{CarId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 車両ビュー
///
/// 予約コンテキストから見た車両情報。予約コンテキストは車両を更新しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarView {
    pub car_id: CarId,
    pub owner_id: UserId,
    pub brand: String,
    pub model: String,
    pub location: String,
    pub price: i64,
    pub is_available: bool,
}

/// 車両カタログポート
///
/// 予約コンテキストと車両カタログコンテキストの境界を維持する。
#[async_trait]
pub trait CarCatalog: Send + Sync {
    /// 地域内の貸出可能フラグが立っている車両を取得する
    ///
    /// 返却順はカタログの登録順。
    async fn find_available_by_location(&self, location: &str) -> Result<Vec<CarView>>;

    /// IDで車両を取得する
    async fn get_by_id(&self, car_id: CarId) -> Result<Option<CarView>>;

    /// 複数IDの車両をまとめて取得する
    ///
    /// 存在しないIDは無視される。順序は保証しない。
    async fn find_by_ids(&self, car_ids: &[CarId]) -> Result<Vec<CarView>>;
}
