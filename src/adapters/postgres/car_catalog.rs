use crate::domain::value_objects::{CarId, UserId};
use crate::ports::car_catalog::{CarCatalog as CarCatalogTrait, CarView, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

fn map_row_to_car_view(row: &PgRow) -> CarView {
    CarView {
        car_id: CarId::from_uuid(row.get("car_id")),
        owner_id: UserId::from_uuid(row.get("owner_id")),
        brand: row.get("brand"),
        model: row.get("model"),
        location: row.get("location"),
        price: row.get("price"),
        is_available: row.get("is_available"),
    }
}

/// CarCatalogのPostgreSQL実装
///
/// `cars`テーブルを読み取る。車両の登録は車両カタログコンテキストが行い、
/// このアダプターは書き込まない。
pub struct CarCatalog {
    pool: PgPool,
}

impl CarCatalog {
    /// PostgreSQLコネクションプールから新しいCarCatalogを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarCatalogTrait for CarCatalog {
    /// 地域内の貸出可能な車両（登録順）
    async fn find_available_by_location(&self, location: &str) -> Result<Vec<CarView>> {
        let rows = sqlx::query(
            r#"
            SELECT car_id, owner_id, brand, model, location, price, is_available
            FROM cars
            WHERE location = $1 AND is_available
            ORDER BY created_at ASC, car_id ASC
            "#,
        )
        .bind(location)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_car_view).collect())
    }

    async fn get_by_id(&self, car_id: CarId) -> Result<Option<CarView>> {
        let row = sqlx::query(
            r#"
            SELECT car_id, owner_id, brand, model, location, price, is_available
            FROM cars
            WHERE car_id = $1
            "#,
        )
        .bind(car_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_car_view))
    }

    async fn find_by_ids(&self, car_ids: &[CarId]) -> Result<Vec<CarView>> {
        let ids: Vec<Uuid> = car_ids.iter().map(CarId::value).collect();

        let rows = sqlx::query(
            r#"
            SELECT car_id, owner_id, brand, model, location, price, is_available
            FROM cars
            WHERE car_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_car_view).collect())
    }
}
