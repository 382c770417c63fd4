use crate::application::booking::BookingApplicationError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::FailureResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーとリクエスト境界のエラーをまとめる。
/// 既存クライアントとの互換性のため、すべての失敗は HTTP 200 と
/// `{success: false, message}` で返す。
#[derive(Debug)]
pub enum ApiError {
    /// アプリケーション層のエラー
    Application(BookingApplicationError),
    /// リクエストボディが不正（JSONの形式・必須項目・日付形式）
    Validation(String),
    /// 呼び出し元の識別情報がない
    Unauthenticated,
}

impl From<BookingApplicationError> for ApiError {
    fn from(err: BookingApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl ApiError {
    /// クライアントに返すメッセージ
    fn message(&self) -> String {
        match self {
            ApiError::Application(err) => match err {
                BookingApplicationError::Conflict
                | BookingApplicationError::CarNotFound
                | BookingApplicationError::BookingNotFound
                | BookingApplicationError::Unauthorized => err.to_string(),

                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                BookingApplicationError::BookingStoreError(e) => {
                    tracing::error!("Booking store error: {}", e);
                    "Failed to access bookings".to_string()
                }
                BookingApplicationError::CarCatalogError(e) => {
                    tracing::error!("Car catalog error: {}", e);
                    "Failed to access cars".to_string()
                }
                BookingApplicationError::UserDirectoryError(e) => {
                    tracing::error!("User directory error: {}", e);
                    "Failed to access users".to_string()
                }
            },
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Unauthenticated => "Not authorized".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.message();
        tracing::debug!(reason = %message, "Request failed");

        (StatusCode::OK, Json(FailureResponse::new(message))).into_response()
    }
}
