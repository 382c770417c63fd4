use crate::domain::{Booking, BookingId, BookingPeriod, BookingStatus, CarId, UserId};
use crate::ports::booking_store::{BookingStore as BookingStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// BookingStoreのインメモリ実装
///
/// 予約は登録順で1つのMutexの内側に保持する。
/// `insert_if_available`の重複確認と追加は同じロック内で行われる。
pub struct BookingStore {
    bookings: Mutex<Vec<Booking>>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(Vec::new()),
        }
    }

    /// 重複確認なしで予約を追加（テストデータ投入用）
    pub fn add_booking(&self, booking: Booking) {
        self.lock().push(booking);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Booking>> {
        self.bookings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

fn count_overlapping(bookings: &[Booking], car_id: CarId, period: &BookingPeriod) -> usize {
    bookings
        .iter()
        .filter(|b| b.car_id == car_id && b.period.overlaps(period))
        .count()
}

#[async_trait]
impl BookingStoreTrait for BookingStore {
    async fn count_overlapping(&self, car_id: CarId, period: BookingPeriod) -> Result<usize> {
        Ok(count_overlapping(&self.lock(), car_id, &period))
    }

    async fn insert_if_available(&self, booking: &Booking) -> Result<bool> {
        let mut bookings = self.lock();
        if count_overlapping(&bookings, booking.car_id, &booking.period) > 0 {
            return Ok(false);
        }
        bookings.push(booking.clone());
        Ok(true)
    }

    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        Ok(self
            .lock()
            .iter()
            .find(|b| b.booking_id == booking_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let bookings = self
            .lock()
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(bookings))
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Booking>> {
        let bookings = self
            .lock()
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(bookings))
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        status: &BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(booking) = self
            .lock()
            .iter_mut()
            .find(|b| b.booking_id == booking_id)
        {
            booking.status = status.clone();
            booking.updated_at = updated_at;
        }
        Ok(())
    }
}
