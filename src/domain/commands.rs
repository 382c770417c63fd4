use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, BookingPeriod, BookingStatus, CarId, UserId, UserRole};

/// コマンド：指定地域・期間で借りられる車両を検索する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchAvailability {
    pub location: String,
    pub period: BookingPeriod,
}

/// コマンド：車両を予約する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBooking {
    pub requester_id: UserId,
    pub car_id: CarId,
    pub period: BookingPeriod,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：オーナーとして自分の車両の予約一覧を取得する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOwnerBookings {
    pub owner_id: UserId,
    pub role: UserRole,
}

/// コマンド：予約ステータスを変更する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBookingStatus {
    pub caller_id: UserId,
    pub booking_id: BookingId,
    pub status: BookingStatus,
    pub changed_at: DateTime<Utc>,
}
