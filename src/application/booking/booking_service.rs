use crate::domain::{self, Booking, CarId, DateLabels, UserId, UserRole, commands::*};
use crate::ports::*;
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::availability::is_available;
use super::errors::{BookingApplicationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub booking_store: Arc<dyn BookingStore>,
    pub car_catalog: Arc<dyn CarCatalog>,
    pub user_directory: Arc<dyn UserDirectory>,
}

/// 検索結果の車両（リクエストされた期間のラベル付き）
#[derive(Debug, Clone)]
pub struct AvailableCar {
    pub car: CarView,
    pub requested_dates: DateLabels,
}

/// 空き車両検索の結果
#[derive(Debug, Clone)]
pub struct AvailabilitySearch {
    pub cars: Vec<AvailableCar>,
    pub search_dates: DateLabels,
}

/// 表示用の予約
///
/// `car`は一覧取得時のみ埋められる。車両が削除済みの場合も`None`。
/// `renter`はオーナー向け一覧でのみ埋められる。
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub booking: Booking,
    pub car: Option<CarView>,
    pub renter: Option<UserView>,
    pub booking_dates: DateLabels,
}

impl BookingDetails {
    fn new(booking: Booking, car: Option<CarView>) -> Self {
        let booking_dates = DateLabels::new(booking.period.book_date, booking.period.purchase_date);
        Self {
            booking,
            car,
            renter: None,
            booking_dates,
        }
    }
}

/// 予約一覧に車両情報を付与するヘルパー関数
///
/// 重複を除いた車両IDで1回だけカタログを引き、予約の順序は保つ。
async fn attach_cars(
    car_catalog: &Arc<dyn CarCatalog>,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingDetails>> {
    let car_ids: Vec<CarId> = bookings
        .iter()
        .map(|b| b.car_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let cars: HashMap<CarId, CarView> = if car_ids.is_empty() {
        HashMap::new()
    } else {
        car_catalog
            .find_by_ids(&car_ids)
            .await
            .map_err(BookingApplicationError::CarCatalogError)?
            .into_iter()
            .map(|car| (car.car_id, car))
            .collect()
    };

    Ok(bookings
        .into_iter()
        .map(|booking| {
            let car = cars.get(&booking.car_id).cloned();
            BookingDetails::new(booking, car)
        })
        .collect())
}

/// 予約一覧に借り手の情報を付与するヘルパー関数
///
/// `attach_cars()`と同様に、重複を除いたユーザーIDで1回だけディレクトリを引く。
async fn attach_renters(
    user_directory: &Arc<dyn UserDirectory>,
    details: Vec<BookingDetails>,
) -> Result<Vec<BookingDetails>> {
    let user_ids: Vec<UserId> = details
        .iter()
        .map(|d| d.booking.user_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let users: HashMap<UserId, UserView> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        user_directory
            .find_by_ids(&user_ids)
            .await
            .map_err(BookingApplicationError::UserDirectoryError)?
            .into_iter()
            .map(|user| (user.user_id, user))
            .collect()
    };

    Ok(details
        .into_iter()
        .map(|mut d| {
            d.renter = users.get(&d.booking.user_id).cloned();
            d
        })
        .collect())
}

/// 指定地域・期間で借りられる車両を検索する（純粋な関数）
///
/// 処理フロー：
/// 1. 地域内の貸出可能フラグが立っている車両を取得
/// 2. 各車両の空き状況を並行して確認
/// 3. 空いている車両のみを取得順のまま返す
///
/// 検索時点の結果は予約作成時には古くなっている可能性がある。
/// 確定的な確認は`create_booking()`で行う。
pub async fn search_availability(
    deps: &ServiceDependencies,
    cmd: SearchAvailability,
) -> Result<AvailabilitySearch> {
    let search_dates = DateLabels::new(cmd.period.book_date, cmd.period.purchase_date);
    tracing::info!(
        location = %cmd.location,
        "Checking availability for dates: {}",
        search_dates.date_range
    );

    // 1. 候補車両の取得
    let cars = deps
        .car_catalog
        .find_available_by_location(&cmd.location)
        .await
        .map_err(BookingApplicationError::CarCatalogError)?;

    // 2. 空き状況を並行確認（結果は入力順）
    let checks = cars
        .iter()
        .map(|car| is_available(deps.booking_store.as_ref(), car.car_id, cmd.period));
    let availability = try_join_all(checks).await?;

    // 3. 空いている車両のみ残す
    let cars = cars
        .into_iter()
        .zip(availability)
        .filter(|(_, available)| *available)
        .map(|(car, _)| AvailableCar {
            car,
            requested_dates: search_dates.clone(),
        })
        .collect();

    Ok(AvailabilitySearch { cars, search_dates })
}

/// 車両を予約する（純粋な関数）
///
/// ビジネスルール：
/// - 指定期間に重なる予約がないこと
/// - 車両が存在すること
/// - 料金とオーナーは車両から取得する
///
/// # 一貫性保証
///
/// 事前の空き確認の後、`BookingStore::insert_if_available()`が
/// 同一車両について確認と保存を直列化して再確認する。
/// 同時に重なる予約が作成された場合、後着側は`Conflict`になる。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 予約コマンド
///
/// # 戻り値
/// 作成された予約（日付ラベル付き）
pub async fn create_booking(
    deps: &ServiceDependencies,
    cmd: CreateBooking,
) -> Result<BookingDetails> {
    tracing::info!(
        car_id = %cmd.car_id.value(),
        "Creating booking for dates: {}",
        domain::date_format::format_range(
            Some(cmd.period.book_date),
            Some(cmd.period.purchase_date)
        )
    );

    // 1. 空き状況の確認
    if !is_available(deps.booking_store.as_ref(), cmd.car_id, cmd.period).await? {
        return Err(BookingApplicationError::Conflict);
    }

    // 2. 車両の取得（オーナーと料金）
    let car = deps
        .car_catalog
        .get_by_id(cmd.car_id)
        .await
        .map_err(BookingApplicationError::CarCatalogError)?
        .ok_or(BookingApplicationError::CarNotFound)?;

    // 3. ドメイン層の純粋関数を呼び出し
    let booking = domain::booking::create_booking(
        car.car_id,
        cmd.requester_id,
        car.owner_id,
        cmd.period,
        car.price,
        cmd.requested_at,
    );

    // 4. 重複確認付きで保存
    let inserted = deps
        .booking_store
        .insert_if_available(&booking)
        .await
        .map_err(BookingApplicationError::BookingStoreError)?;

    if !inserted {
        tracing::warn!(
            car_id = %cmd.car_id.value(),
            "Overlapping booking was created concurrently"
        );
        return Err(BookingApplicationError::Conflict);
    }

    Ok(BookingDetails::new(booking, Some(car)))
}

/// 借り手の予約一覧を取得する（作成日時の新しい順）
pub async fn list_user_bookings(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<BookingDetails>> {
    let bookings = deps
        .booking_store
        .find_by_user(user_id)
        .await
        .map_err(BookingApplicationError::BookingStoreError)?;

    attach_cars(&deps.car_catalog, bookings).await
}

/// オーナーの車両に対する予約一覧を取得する（作成日時の新しい順）
///
/// ロールがオーナーでない場合はストアに触れずに`Unauthorized`を返す。
/// 各予約には車両と借り手の公開情報を付与する。
pub async fn list_owner_bookings(
    deps: &ServiceDependencies,
    cmd: ListOwnerBookings,
) -> Result<Vec<BookingDetails>> {
    if cmd.role != UserRole::Owner {
        return Err(BookingApplicationError::Unauthorized);
    }

    let bookings = deps
        .booking_store
        .find_by_owner(cmd.owner_id)
        .await
        .map_err(BookingApplicationError::BookingStoreError)?;

    let details = attach_cars(&deps.car_catalog, bookings).await?;
    attach_renters(&deps.user_directory, details).await
}

/// 予約ステータスを変更する（純粋な関数）
///
/// ビジネスルール：
/// - 予約が存在すること
/// - 呼び出し元が車両オーナーであること
/// - ステータスの値は検証しない
pub async fn change_status(
    deps: &ServiceDependencies,
    cmd: ChangeBookingStatus,
) -> Result<BookingDetails> {
    // 1. 予約の取得
    let booking = deps
        .booking_store
        .get_by_id(cmd.booking_id)
        .await
        .map_err(BookingApplicationError::BookingStoreError)?
        .ok_or(BookingApplicationError::BookingNotFound)?;

    // 2. ドメイン層の純粋関数を呼び出し（所有者確認）
    let updated =
        domain::booking::change_status(booking, cmd.caller_id, cmd.status, cmd.changed_at)
            .map_err(|_| BookingApplicationError::Unauthorized)?;

    // 3. 保存
    deps.booking_store
        .update_status(updated.booking_id, &updated.status, updated.updated_at)
        .await
        .map_err(BookingApplicationError::BookingStoreError)?;

    let details = BookingDetails::new(updated, None);
    tracing::info!(
        booking_id = %details.booking.booking_id.value(),
        status = %details.booking.status,
        "Booking status updated for dates: {}",
        details.booking_dates.date_range
    );

    Ok(details)
}
