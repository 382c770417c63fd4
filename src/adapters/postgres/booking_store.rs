use crate::domain::{Booking, BookingId, BookingPeriod, BookingStatus, CarId, UserId};
use crate::ports::booking_store::{BookingStore as BookingStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをBookingに変換する
fn map_row_to_booking(row: &PgRow) -> Booking {
    let status: String = row.get("status");

    Booking {
        booking_id: BookingId::from_uuid(row.get("booking_id")),
        car_id: CarId::from_uuid(row.get("car_id")),
        user_id: UserId::from_uuid(row.get("user_id")),
        owner_id: UserId::from_uuid(row.get("owner_id")),
        period: BookingPeriod::new(row.get("book_date"), row.get("purchase_date")),
        price: row.get("price"),
        status: BookingStatus::from(status),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// BookingStoreのPostgreSQL実装
pub struct BookingStore {
    pool: PgPool,
}

impl BookingStore {
    /// PostgreSQLコネクションプールから新しいBookingStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStoreTrait for BookingStore {
    /// 重なる予約の件数（(car_id, book_date, purchase_date)のインデックスを使用）
    async fn count_overlapping(&self, car_id: CarId, period: BookingPeriod) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE car_id = $1
              AND book_date <= $3
              AND purchase_date >= $2
            "#,
        )
        .bind(car_id.value())
        .bind(period.book_date)
        .bind(period.purchase_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(usize::try_from(count)?)
    }

    /// 重複確認と保存を1トランザクションで行う
    ///
    /// 車両の行を`FOR UPDATE`でロックしてから件数を数えるため、
    /// 同じ車両への同時予約はここで順番待ちになる。
    /// READ COMMITTEDでもロック取得後の COUNT は先行トランザクションの
    /// コミット結果を読む。
    async fn insert_if_available(&self, booking: &Booking) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT car_id FROM cars WHERE car_id = $1 FOR UPDATE")
            .bind(booking.car_id.value())
            .fetch_optional(&mut *tx)
            .await?;

        let overlapping: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE car_id = $1
              AND book_date <= $3
              AND purchase_date >= $2
            "#,
        )
        .bind(booking.car_id.value())
        .bind(booking.period.book_date)
        .bind(booking.period.purchase_date)
        .fetch_one(&mut *tx)
        .await?;

        if overlapping > 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_id,
                car_id,
                user_id,
                owner_id,
                book_date,
                purchase_date,
                price,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(booking.booking_id.value())
        .bind(booking.car_id.value())
        .bind(booking.user_id.value())
        .bind(booking.owner_id.value())
        .bind(booking.period.book_date)
        .bind(booking.period.purchase_date)
        .bind(booking.price)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT
                booking_id,
                car_id,
                user_id,
                owner_id,
                book_date,
                purchase_date,
                price,
                status,
                created_at,
                updated_at
            FROM bookings
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_booking))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT
                booking_id,
                car_id,
                user_id,
                owner_id,
                book_date,
                purchase_date,
                price,
                status,
                created_at,
                updated_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_booking).collect())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT
                booking_id,
                car_id,
                user_id,
                owner_id,
                book_date,
                purchase_date,
                price,
                status,
                created_at,
                updated_at
            FROM bookings
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_booking).collect())
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        status: &BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = $3
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id.value())
        .bind(status.as_str())
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
