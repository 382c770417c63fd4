use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::application::booking::{AvailabilitySearch, AvailableCar, BookingDetails};
use crate::domain::{
    BookingId, BookingPeriod, BookingStatus, CarId, DateLabels, UserId, commands::*,
};
use crate::ports::{CarView, UserView};

// ============================================================================
// 日付パース
// ============================================================================

/// リクエストの日付文字列をパースする
///
/// `YYYY-MM-DD`（UTCの0時とみなす）とRFC 3339を受け付ける。
pub fn parse_request_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| format!("Invalid date: {}", value))
}

/// リクエスト受付時刻
///
/// PostgreSQL TIMESTAMPTZの精度（マイクロ秒）に揃える。作成直後のレスポンスと
/// 後の一覧取得で同じ予約の時刻が食い違わないようにする。
fn received_at() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_request_date(&value).map_err(serde::de::Error::custom)
}

// ============================================================================
// リクエスト
// ============================================================================

/// POST /api/bookings/check-availability
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    pub location: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub book_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_date")]
    pub purchase_date: DateTime<Utc>,
}

impl CheckAvailabilityRequest {
    pub fn to_command(&self) -> SearchAvailability {
        SearchAvailability {
            location: self.location.clone(),
            period: BookingPeriod::new(self.book_date, self.purchase_date),
        }
    }
}

/// POST /api/bookings/create
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// 予約する車両のID
    pub car: Uuid,
    #[serde(deserialize_with = "deserialize_date")]
    pub book_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_date")]
    pub purchase_date: DateTime<Utc>,
}

impl CreateBookingRequest {
    pub fn to_command(&self, requester_id: UserId) -> CreateBooking {
        CreateBooking {
            requester_id,
            car_id: CarId::from_uuid(self.car),
            period: BookingPeriod::new(self.book_date, self.purchase_date),
            requested_at: received_at(),
        }
    }
}

/// POST /api/bookings/change-status
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBookingStatusRequest {
    pub booking_id: Uuid,
    pub status: String,
}

impl ChangeBookingStatusRequest {
    pub fn to_command(&self, caller_id: UserId) -> ChangeBookingStatus {
        ChangeBookingStatus {
            caller_id,
            booking_id: BookingId::from_uuid(self.booking_id),
            status: BookingStatus::from(self.status.as_str()),
            changed_at: received_at(),
        }
    }
}

// ============================================================================
// レスポンス
// ============================================================================

/// 車両レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub brand: String,
    pub model: String,
    pub location: String,
    pub price: i64,
    pub is_available: bool,
}

impl From<CarView> for CarResponse {
    fn from(car: CarView) -> Self {
        Self {
            id: car.car_id.value(),
            owner: car.owner_id.value(),
            brand: car.brand,
            model: car.model,
            location: car.location,
            price: car.price,
            is_available: car.is_available,
        }
    }
}

/// 借り手レスポンス（公開情報のみ）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<UserView> for UserResponse {
    fn from(user: UserView) -> Self {
        Self {
            id: user.user_id.value(),
            name: user.name,
            email: user.email,
        }
    }
}

/// 検索結果の車両（空き状況と要求期間のラベル付き）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCarResponse {
    #[serde(flatten)]
    pub car: CarResponse,
    pub requested_dates: DateLabels,
}

impl From<AvailableCar> for AvailableCarResponse {
    fn from(available: AvailableCar) -> Self {
        Self {
            car: CarResponse::from(available.car),
            requested_dates: available.requested_dates,
        }
    }
}

/// POST /api/bookings/check-availability のレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityResponse {
    pub success: bool,
    pub available_cars: Vec<AvailableCarResponse>,
    pub search_dates: DateLabels,
}

impl From<AvailabilitySearch> for CheckAvailabilityResponse {
    fn from(search: AvailabilitySearch) -> Self {
        Self {
            success: true,
            available_cars: search
                .cars
                .into_iter()
                .map(AvailableCarResponse::from)
                .collect(),
            search_dates: search.search_dates,
        }
    }
}

/// 予約レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub car: Uuid,
    pub user: Uuid,
    pub owner: Uuid,
    pub book_date: DateTime<Utc>,
    pub purchase_date: DateTime<Utc>,
    pub price: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 一覧取得時のみ含まれる車両情報
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_details: Option<CarResponse>,
    /// オーナー向け一覧のみ含まれる借り手情報
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserResponse>,
    pub booking_dates: DateLabels,
}

impl From<BookingDetails> for BookingResponse {
    fn from(details: BookingDetails) -> Self {
        let booking = details.booking;
        Self {
            id: booking.booking_id.value(),
            car: booking.car_id.value(),
            user: booking.user_id.value(),
            owner: booking.owner_id.value(),
            book_date: booking.period.book_date,
            purchase_date: booking.period.purchase_date,
            price: booking.price,
            status: String::from(booking.status),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
            car_details: details.car.map(CarResponse::from),
            user_details: details.renter.map(UserResponse::from),
            booking_dates: details.booking_dates,
        }
    }
}

/// 予約作成・ステータス変更のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResultResponse {
    pub success: bool,
    pub message: String,
    pub booking: BookingResponse,
}

impl BookingResultResponse {
    pub fn new(message: impl Into<String>, details: BookingDetails) -> Self {
        Self {
            success: true,
            message: message.into(),
            booking: BookingResponse::from(details),
        }
    }
}

/// 予約一覧のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingsResponse {
    pub success: bool,
    pub bookings: Vec<BookingResponse>,
}

impl From<Vec<BookingDetails>> for BookingsResponse {
    fn from(bookings: Vec<BookingDetails>) -> Self {
        Self {
            success: true,
            bookings: bookings.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

/// 失敗レスポンス
///
/// 失敗の種類に関わらずこの形で返す。
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

impl FailureResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
