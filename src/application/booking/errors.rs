use thiserror::Error;

/// 予約管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookingApplicationError {
    /// 指定期間に重なる予約がある
    #[error("Car is not available for the selected dates")]
    Conflict,

    /// 車両が存在しない
    #[error("Car not found")]
    CarNotFound,

    /// 予約が見つからない
    #[error("Booking not found")]
    BookingNotFound,

    /// ロールまたは所有者の不一致
    #[error("Unauthorized")]
    Unauthorized,

    /// BookingStoreのエラー
    #[error("Booking store error")]
    BookingStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// CarCatalogのエラー
    #[error("Car catalog error")]
    CarCatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// UserDirectoryのエラー
    #[error("User directory error")]
    UserDirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookingApplicationError>;
