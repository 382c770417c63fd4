mod common;

use async_trait::async_trait;
use car_rental_booking::application::booking::{
    BookingApplicationError, ServiceDependencies, change_status, create_booking, is_available,
    list_owner_bookings, list_user_bookings, search_availability,
};
use car_rental_booking::domain::booking::{self, BookingPeriod};
use car_rental_booking::domain::commands::*;
use car_rental_booking::domain::value_objects::*;
use car_rental_booking::domain::{Booking, BookingStatus};
use car_rental_booking::ports::*;
use chrono::{DateTime, Duration, Utc};
use common::{car_at, june, memory_fixture, user_named};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// テスト用ヘルパー
// ============================================================================

fn create_cmd(requester_id: UserId, car_id: CarId, start: u32, end: u32) -> CreateBooking {
    CreateBooking {
        requester_id,
        car_id,
        period: BookingPeriod::new(june(start), june(end)),
        requested_at: Utc::now(),
    }
}

fn search_cmd(location: &str, start: u32, end: u32) -> SearchAvailability {
    SearchAvailability {
        location: location.to_string(),
        period: BookingPeriod::new(june(start), june(end)),
    }
}

/// 呼び出し回数を数えるBookingStore（ストアに触れたかの確認用）
struct CountingBookingStore {
    calls: AtomicUsize,
}

impl CountingBookingStore {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingStore for CountingBookingStore {
    async fn count_overlapping(
        &self,
        _car_id: CarId,
        _period: BookingPeriod,
    ) -> booking_store::Result<usize> {
        self.touch();
        Ok(0)
    }

    async fn insert_if_available(&self, _booking: &Booking) -> booking_store::Result<bool> {
        self.touch();
        Ok(true)
    }

    async fn get_by_id(&self, _booking_id: BookingId) -> booking_store::Result<Option<Booking>> {
        self.touch();
        Ok(None)
    }

    async fn find_by_user(&self, _user_id: UserId) -> booking_store::Result<Vec<Booking>> {
        self.touch();
        Ok(Vec::new())
    }

    async fn find_by_owner(&self, _owner_id: UserId) -> booking_store::Result<Vec<Booking>> {
        self.touch();
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _booking_id: BookingId,
        _status: &BookingStatus,
        _updated_at: DateTime<Utc>,
    ) -> booking_store::Result<()> {
        self.touch();
        Ok(())
    }
}

/// 常に失敗するBookingStore
struct FailingBookingStore;

#[async_trait]
impl BookingStore for FailingBookingStore {
    async fn count_overlapping(
        &self,
        _car_id: CarId,
        _period: BookingPeriod,
    ) -> booking_store::Result<usize> {
        Err("database unavailable".into())
    }

    async fn insert_if_available(&self, _booking: &Booking) -> booking_store::Result<bool> {
        Err("database unavailable".into())
    }

    async fn get_by_id(&self, _booking_id: BookingId) -> booking_store::Result<Option<Booking>> {
        Err("database unavailable".into())
    }

    async fn find_by_user(&self, _user_id: UserId) -> booking_store::Result<Vec<Booking>> {
        Err("database unavailable".into())
    }

    async fn find_by_owner(&self, _owner_id: UserId) -> booking_store::Result<Vec<Booking>> {
        Err("database unavailable".into())
    }

    async fn update_status(
        &self,
        _booking_id: BookingId,
        _status: &BookingStatus,
        _updated_at: DateTime<Utc>,
    ) -> booking_store::Result<()> {
        Err("database unavailable".into())
    }
}

// ============================================================================
// 空き状況確認
// ============================================================================

#[tokio::test]
async fn test_is_available_true_without_bookings() {
    let fixture = memory_fixture();
    let period = BookingPeriod::new(june(1), june(5));

    let available = is_available(fixture.deps.booking_store.as_ref(), CarId::new(), period)
        .await
        .unwrap();

    assert!(available);
}

#[tokio::test]
async fn test_is_available_ignores_booking_status() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;

    let mut cancelled = booking::create_booking(
        car_id,
        UserId::new(),
        car.owner_id,
        BookingPeriod::new(june(1), june(5)),
        100,
        Utc::now(),
    );
    cancelled.status = BookingStatus::Cancelled;
    fixture.booking_store.add_booking(cancelled);

    let available = is_available(
        fixture.deps.booking_store.as_ref(),
        car_id,
        BookingPeriod::new(june(3), june(4)),
    )
    .await
    .unwrap();

    assert!(!available);
}

// ============================================================================
// 予約作成
// ============================================================================

#[tokio::test]
async fn test_create_booking_copies_owner_and_price() {
    let fixture = memory_fixture();
    let owner_id = UserId::new();
    let renter_id = UserId::new();
    let car = car_at("NYC", owner_id, 250);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let details = create_booking(&fixture.deps, create_cmd(renter_id, car_id, 1, 5))
        .await
        .unwrap();

    assert_eq!(details.booking.car_id, car_id);
    assert_eq!(details.booking.user_id, renter_id);
    assert_eq!(details.booking.owner_id, owner_id);
    assert_eq!(details.booking.price, 250);
    assert_eq!(details.booking.status, BookingStatus::Pending);
    assert_eq!(details.booking_dates.date_range, "June 1, 2024 to June 5, 2024");
    assert!(details.car.is_some());

    // 保存されていること
    let stored = fixture
        .booking_store
        .get_by_id(details.booking.booking_id)
        .await
        .unwrap();
    assert_eq!(stored, Some(details.booking));
}

#[tokio::test]
async fn test_create_booking_conflicts_with_overlapping_booking() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 1, 5))
        .await
        .unwrap();

    let result = create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 3, 8)).await;
    assert!(matches!(result, Err(BookingApplicationError::Conflict)));

    // 境界が一致する場合も重複とみなす
    let result = create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 5, 6)).await;
    assert!(matches!(result, Err(BookingApplicationError::Conflict)));
}

#[tokio::test]
async fn test_create_booking_non_overlapping_both_succeed() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let first = create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 1, 5)).await;
    let second = create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 6, 10)).await;

    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_create_booking_unknown_car() {
    let fixture = memory_fixture();

    let result = create_booking(&fixture.deps, create_cmd(UserId::new(), CarId::new(), 1, 5)).await;

    assert!(matches!(result, Err(BookingApplicationError::CarNotFound)));
}

#[tokio::test]
async fn test_concurrent_overlapping_creations_admit_only_one() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let deps = fixture.deps.clone();
            tokio::spawn(async move {
                create_booking(&deps, create_cmd(UserId::new(), car_id, 1, 5)).await
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(BookingApplicationError::Conflict) => conflicts += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 15);
}

#[tokio::test]
async fn test_create_booking_propagates_store_errors() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let deps = ServiceDependencies {
        booking_store: Arc::new(FailingBookingStore),
        car_catalog: fixture.car_catalog.clone(),
        user_directory: fixture.user_directory.clone(),
    };

    let result = create_booking(&deps, create_cmd(UserId::new(), car_id, 1, 5)).await;
    assert!(matches!(
        result,
        Err(BookingApplicationError::BookingStoreError(_))
    ));
}

// ============================================================================
// 空き車両検索
// ============================================================================

#[tokio::test]
async fn test_search_availability_nyc_scenario() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 1, 5))
        .await
        .unwrap();

    // 既存予約の期間内 → 除外
    let inside = search_availability(&fixture.deps, search_cmd("NYC", 3, 4))
        .await
        .unwrap();
    assert!(inside.cars.iter().all(|c| c.car.car_id != car_id));

    // 既存予約の後 → 含まれる
    let after = search_availability(&fixture.deps, search_cmd("NYC", 6, 10))
        .await
        .unwrap();
    assert_eq!(after.cars.len(), 1);
    assert_eq!(after.cars[0].car.car_id, car_id);
    assert_eq!(after.search_dates.book_date, "June 6, 2024");
    assert_eq!(
        after.cars[0].requested_dates.date_range,
        "June 6, 2024 to June 10, 2024"
    );
}

#[tokio::test]
async fn test_search_availability_preserves_catalog_order() {
    let fixture = memory_fixture();
    let owner_id = UserId::new();

    let cars: Vec<CarView> = (0..5).map(|i| car_at("NYC", owner_id, 100 + i)).collect();
    for car in &cars {
        fixture.car_catalog.add_car(car.clone());
    }

    // 2番目の車両だけ予約で塞ぐ
    create_booking(&fixture.deps, create_cmd(UserId::new(), cars[1].car_id, 1, 5))
        .await
        .unwrap();

    let result = search_availability(&fixture.deps, search_cmd("NYC", 2, 3))
        .await
        .unwrap();

    let ids: Vec<CarId> = result.cars.iter().map(|c| c.car.car_id).collect();
    let expected: Vec<CarId> = cars
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 1)
        .map(|(_, c)| c.car_id)
        .collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_search_availability_filters_location_and_flag() {
    let fixture = memory_fixture();
    let owner_id = UserId::new();

    let in_nyc = car_at("NYC", owner_id, 100);
    let in_boston = car_at("Boston", owner_id, 100);
    let mut withdrawn = car_at("NYC", owner_id, 100);
    withdrawn.is_available = false;

    fixture.car_catalog.add_car(in_nyc.clone());
    fixture.car_catalog.add_car(in_boston);
    fixture.car_catalog.add_car(withdrawn);

    let result = search_availability(&fixture.deps, search_cmd("NYC", 1, 2))
        .await
        .unwrap();

    assert_eq!(result.cars.len(), 1);
    assert_eq!(result.cars[0].car.car_id, in_nyc.car_id);
}

// ============================================================================
// 予約一覧
// ============================================================================

#[tokio::test]
async fn test_list_user_bookings_newest_first_with_car() {
    let fixture = memory_fixture();
    let renter_id = UserId::new();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let now = Utc::now();
    for (i, start) in [1u32, 10, 20].into_iter().enumerate() {
        let mut cmd = create_cmd(renter_id, car_id, start, start + 2);
        cmd.requested_at = now + Duration::minutes(i as i64);
        create_booking(&fixture.deps, cmd).await.unwrap();
    }
    // 他人の予約は含まれない
    create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 25, 26))
        .await
        .unwrap();

    let bookings = list_user_bookings(&fixture.deps, renter_id).await.unwrap();

    assert_eq!(bookings.len(), 3);
    assert_eq!(bookings[0].booking.period.book_date, june(20));
    assert_eq!(bookings[1].booking.period.book_date, june(10));
    assert_eq!(bookings[2].booking.period.book_date, june(1));
    assert!(bookings.iter().all(|b| b.car.as_ref().map(|c| c.car_id) == Some(car_id)));
    assert_eq!(bookings[2].booking_dates.book_date, "June 1, 2024");
}

#[tokio::test]
async fn test_list_owner_bookings_requires_owner_role_without_touching_store() {
    let fixture = memory_fixture();
    let store = Arc::new(CountingBookingStore::new());
    let deps = ServiceDependencies {
        booking_store: store.clone(),
        car_catalog: fixture.car_catalog.clone(),
        user_directory: fixture.user_directory.clone(),
    };

    let cmd = ListOwnerBookings {
        owner_id: UserId::new(),
        role: UserRole::User,
    };
    let result = list_owner_bookings(&deps, cmd).await;

    assert!(matches!(result, Err(BookingApplicationError::Unauthorized)));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_list_owner_bookings_returns_bookings_on_owned_cars() {
    let fixture = memory_fixture();
    let owner_id = UserId::new();
    let mine = car_at("NYC", owner_id, 100);
    let theirs = car_at("NYC", UserId::new(), 100);
    let (mine_id, theirs_id) = (mine.car_id, theirs.car_id);
    fixture.car_catalog.add_car(mine);
    fixture.car_catalog.add_car(theirs);

    create_booking(&fixture.deps, create_cmd(UserId::new(), mine_id, 1, 2))
        .await
        .unwrap();
    create_booking(&fixture.deps, create_cmd(UserId::new(), theirs_id, 1, 2))
        .await
        .unwrap();

    let cmd = ListOwnerBookings {
        owner_id,
        role: UserRole::Owner,
    };
    let bookings = list_owner_bookings(&fixture.deps, cmd).await.unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].booking.car_id, mine_id);
    assert_eq!(bookings[0].booking.owner_id, owner_id);
}

#[tokio::test]
async fn test_list_owner_bookings_attaches_renter_details() {
    let fixture = memory_fixture();
    let owner_id = UserId::new();
    let car = car_at("NYC", owner_id, 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let alice = user_named("Alice");
    fixture.user_directory.add_user(alice.clone());
    // ディレクトリに存在しない借り手
    let unknown_renter = UserId::new();

    let mut first = create_cmd(alice.user_id, car_id, 1, 2);
    first.requested_at = Utc::now() - Duration::minutes(1);
    create_booking(&fixture.deps, first).await.unwrap();
    create_booking(&fixture.deps, create_cmd(unknown_renter, car_id, 5, 6))
        .await
        .unwrap();

    let cmd = ListOwnerBookings {
        owner_id,
        role: UserRole::Owner,
    };
    let bookings = list_owner_bookings(&fixture.deps, cmd).await.unwrap();

    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0].booking.user_id, unknown_renter);
    assert_eq!(bookings[0].renter, None);
    assert_eq!(bookings[1].renter, Some(alice));
    assert!(bookings.iter().all(|b| b.car.is_some()));
}

#[tokio::test]
async fn test_list_user_bookings_omits_renter_details() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let alice = user_named("Alice");
    fixture.user_directory.add_user(alice.clone());
    create_booking(&fixture.deps, create_cmd(alice.user_id, car_id, 1, 2))
        .await
        .unwrap();

    let bookings = list_user_bookings(&fixture.deps, alice.user_id).await.unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].renter, None);
}

// ============================================================================
// ステータス変更
// ============================================================================

#[tokio::test]
async fn test_change_status_by_owner() {
    let fixture = memory_fixture();
    let owner_id = UserId::new();
    let car = car_at("NYC", owner_id, 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let created = create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 1, 5))
        .await
        .unwrap();
    let booking_id = created.booking.booking_id;

    let cmd = ChangeBookingStatus {
        caller_id: owner_id,
        booking_id,
        status: BookingStatus::Confirmed,
        changed_at: Utc::now(),
    };
    let updated = change_status(&fixture.deps, cmd).await.unwrap();
    assert_eq!(updated.booking.status, BookingStatus::Confirmed);

    let stored = fixture
        .booking_store
        .get_by_id(booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_change_status_rejects_non_owner() {
    let fixture = memory_fixture();
    let car = car_at("NYC", UserId::new(), 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let renter_id = UserId::new();
    let created = create_booking(&fixture.deps, create_cmd(renter_id, car_id, 1, 5))
        .await
        .unwrap();
    let booking_id = created.booking.booking_id;

    // 借り手本人でもオーナーでなければ変更できない
    let cmd = ChangeBookingStatus {
        caller_id: renter_id,
        booking_id,
        status: BookingStatus::Cancelled,
        changed_at: Utc::now(),
    };
    let result = change_status(&fixture.deps, cmd).await;
    assert!(matches!(result, Err(BookingApplicationError::Unauthorized)));

    let stored = fixture
        .booking_store
        .get_by_id(booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_change_status_missing_booking() {
    let fixture = memory_fixture();

    let cmd = ChangeBookingStatus {
        caller_id: UserId::new(),
        booking_id: BookingId::new(),
        status: BookingStatus::Confirmed,
        changed_at: Utc::now(),
    };
    let result = change_status(&fixture.deps, cmd).await;

    assert!(matches!(
        result,
        Err(BookingApplicationError::BookingNotFound)
    ));
}

#[tokio::test]
async fn test_change_status_accepts_any_value() {
    let fixture = memory_fixture();
    let owner_id = UserId::new();
    let car = car_at("NYC", owner_id, 100);
    let car_id = car.car_id;
    fixture.car_catalog.add_car(car);

    let created = create_booking(&fixture.deps, create_cmd(UserId::new(), car_id, 1, 5))
        .await
        .unwrap();

    let cmd = ChangeBookingStatus {
        caller_id: owner_id,
        booking_id: created.booking.booking_id,
        status: BookingStatus::from("awaiting-pickup"),
        changed_at: Utc::now(),
    };
    let updated = change_status(&fixture.deps, cmd).await.unwrap();

    assert_eq!(updated.booking.status.as_str(), "awaiting-pickup");
}
