use crate::domain::{BookingPeriod, CarId};
use crate::ports::BookingStore;

use super::errors::{BookingApplicationError, Result};

/// 車両が指定期間に予約可能か確認する（純粋な関数）
///
/// 期間が重なる既存予約が0件なら`true`。
/// 予約のステータスは見ないため、キャンセル済みの予約も空きを塞ぐ。
pub async fn is_available(
    booking_store: &dyn BookingStore,
    car_id: CarId,
    period: BookingPeriod,
) -> Result<bool> {
    let overlapping = booking_store
        .count_overlapping(car_id, period)
        .await
        .map_err(BookingApplicationError::BookingStoreError)?;

    Ok(overlapping == 0)
}
