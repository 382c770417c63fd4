use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, CarId, ChangeStatusError, UserId};

// ============================================================================
// 予約期間
// ============================================================================

/// 予約期間（bookDate 〜 purchaseDate）
///
/// 開始 <= 終了 は前提とするが強制しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPeriod {
    pub book_date: DateTime<Utc>,
    pub purchase_date: DateTime<Utc>,
}

impl BookingPeriod {
    pub fn new(book_date: DateTime<Utc>, purchase_date: DateTime<Utc>) -> Self {
        Self {
            book_date,
            purchase_date,
        }
    }

    /// 期間が重なっているか（両端を含む）
    ///
    /// `self.book_date <= other.purchase_date && self.purchase_date >= other.book_date`
    pub fn overlaps(&self, other: &BookingPeriod) -> bool {
        self.book_date <= other.purchase_date && self.purchase_date >= other.book_date
    }
}

// ============================================================================
// 予約ステータス
// ============================================================================

/// 予約ステータス
///
/// 既知の値は pending / confirmed / cancelled。
/// それ以外の文字列も `Other` としてそのまま保持する（値の検証はしない）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    /// 承認待ち（新規予約の初期状態）
    #[default]
    Pending,
    /// 承認済み
    Confirmed,
    /// キャンセル済み
    Cancelled,
    /// 未知のステータス
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => BookingStatus::Pending,
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Other(s),
        }
    }
}

impl From<&str> for BookingStatus {
    fn from(s: &str) -> Self {
        BookingStatus::from(s.to_string())
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// 予約集約
// ============================================================================

/// Booking集約 - 1台の車両の1回の予約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    // 識別子
    pub booking_id: BookingId,

    // 他の集約への参照（IDのみ）
    pub car_id: CarId,
    pub user_id: UserId,
    pub owner_id: UserId,

    // 予約内容
    pub period: BookingPeriod,
    pub price: i64,
    pub status: BookingStatus,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 純粋関数：予約を作成する
///
/// ビジネスルール：
/// - 料金は予約時点の車両料金をコピーする
/// - オーナーは車両のオーナー
/// - 状態はPending
///
/// 空き状況の確認は呼び出し側の責務。副作用なし。
pub fn create_booking(
    car_id: CarId,
    user_id: UserId,
    owner_id: UserId,
    period: BookingPeriod,
    price: i64,
    created_at: DateTime<Utc>,
) -> Booking {
    Booking {
        booking_id: BookingId::new(),
        car_id,
        user_id,
        owner_id,
        period,
        price,
        status: BookingStatus::Pending,
        created_at,
        updated_at: created_at,
    }
}

/// 純粋関数：予約ステータスを変更する
///
/// ビジネスルール：
/// - 車両オーナーのみ変更可能
/// - 任意のステータスへ遷移できる
pub fn change_status(
    booking: Booking,
    caller: UserId,
    status: BookingStatus,
    changed_at: DateTime<Utc>,
) -> Result<Booking, ChangeStatusError> {
    if booking.owner_id != caller {
        return Err(ChangeStatusError::NotOwner);
    }

    Ok(Booking {
        status,
        updated_at: changed_at,
        ..booking
    })
}
