pub mod booking_store;
pub mod car_catalog;
pub mod user_directory;

// パブリックに型を再エクスポート
pub use booking_store::BookingStore as PostgresBookingStore;
pub use car_catalog::CarCatalog as PostgresCarCatalog;
pub use user_directory::UserDirectory as PostgresUserDirectory;

/// 埋め込みマイグレーション（`migrations/`）
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
