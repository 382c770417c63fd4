use crate::domain::{Booking, BookingId, BookingPeriod, BookingStatus, CarId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約ストアポート
///
/// 予約の永続化と検索を抽象化する。予約は削除されない。
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// 指定期間と重なる車両の予約件数を数える
    ///
    /// 重複条件（両端を含む）:
    /// `existing.book_date <= period.purchase_date AND existing.purchase_date >= period.book_date`
    ///
    /// ステータスは考慮しない。キャンセル済みの予約も件数に含まれる。
    async fn count_overlapping(&self, car_id: CarId, period: BookingPeriod) -> Result<usize>;

    /// 重なる予約がなければ保存する
    ///
    /// 重複確認と保存は同じ車両について直列化される。
    /// 保存した場合は`true`、重なる予約があり保存しなかった場合は`false`を返す。
    async fn insert_if_available(&self, booking: &Booking) -> Result<bool>;

    /// IDで予約を取得する
    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// 借り手の全予約を作成日時の新しい順に取得する
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Booking>>;

    /// オーナーの車両に対する全予約を作成日時の新しい順に取得する
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Booking>>;

    /// 予約ステータスを上書きする
    ///
    /// 対象が存在しない場合は何もしない。
    async fn update_status(
        &self,
        booking_id: BookingId,
        status: &BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}
