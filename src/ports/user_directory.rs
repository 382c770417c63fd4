use crate::domain::value_objects::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ユーザービュー
///
/// 予約コンテキストから見た利用者の公開情報。
/// パスワード等の資格情報は持たない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

/// ユーザーディレクトリポート
///
/// 利用者の登録・認証は別コンテキストが担当し、予約コンテキストは参照のみ行う。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 複数IDのユーザーをまとめて取得する
    ///
    /// 存在しないIDは無視される。順序は保証しない。
    async fn find_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserView>>;
}
