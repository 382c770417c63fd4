use crate::application::booking::{
    ServiceDependencies, change_status, create_booking as execute_create_booking,
    list_owner_bookings, list_user_bookings, search_availability,
};
use crate::domain::commands::ListOwnerBookings;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use super::{
    auth::AuthUser,
    error::ApiError,
    types::{
        BookingResultResponse, BookingsResponse, ChangeBookingStatusRequest,
        CheckAvailabilityRequest, CheckAvailabilityResponse, CreateBookingRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /api/bookings/check-availability - 空き車両を検索
///
/// 指定地域で、指定期間に予約が入っていない車両を返す。
/// 認証不要。
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckAvailabilityRequest>, JsonRejection>,
) -> Result<Json<CheckAvailabilityResponse>, ApiError> {
    let Json(req) = payload?;

    let search = search_availability(&state.service_deps, req.to_command()).await?;

    Ok(Json(CheckAvailabilityResponse::from(search)))
}

/// POST /api/bookings/create - 新しい予約を作成
///
/// 強制されるビジネスルール:
/// - 指定期間に重なる予約がないこと
/// - 車両が存在すること
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<Json<BookingResultResponse>, ApiError> {
    let Json(req) = payload?;

    let cmd = req.to_command(auth.user_id);
    let details = execute_create_booking(&state.service_deps, cmd).await?;

    Ok(Json(BookingResultResponse::new(
        "Booking Created Successfully",
        details,
    )))
}

/// POST /api/bookings/change-status - 予約ステータスを変更
///
/// 車両オーナーのみ変更できる。ステータスの値は検証しない。
pub async fn change_booking_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<ChangeBookingStatusRequest>, JsonRejection>,
) -> Result<Json<BookingResultResponse>, ApiError> {
    let Json(req) = payload?;

    let details = change_status(&state.service_deps, req.to_command(auth.user_id)).await?;

    Ok(Json(BookingResultResponse::new("Status Updated", details)))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /api/bookings/user - 自分の予約一覧（新しい順）
pub async fn user_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BookingsResponse>, ApiError> {
    let bookings = list_user_bookings(&state.service_deps, auth.user_id).await?;

    Ok(Json(BookingsResponse::from(bookings)))
}

/// GET /api/bookings/owner - 自分の車両に対する予約一覧（新しい順）
///
/// ロールがownerの呼び出し元のみ。
pub async fn owner_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BookingsResponse>, ApiError> {
    let cmd = ListOwnerBookings {
        owner_id: auth.user_id,
        role: auth.role,
    };

    let bookings = list_owner_bookings(&state.service_deps, cmd).await?;

    Ok(Json(BookingsResponse::from(bookings)))
}
