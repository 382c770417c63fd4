use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait, UserView};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

/// PostgreSQLの行データをUserViewに変換する
///
/// `password_hash`列は読み出さない。
fn map_row_to_user_view(row: &PgRow) -> UserView {
    UserView {
        user_id: UserId::from_uuid(row.get("user_id")),
        name: row.get("name"),
        email: row.get("email"),
    }
}

/// UserDirectoryのPostgreSQL実装
///
/// `users`テーブルを読み取る。利用者の登録は認証コンテキストが行う。
pub struct UserDirectory {
    pool: PgPool,
}

impl UserDirectory {
    /// PostgreSQLコネクションプールから新しいUserDirectoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn find_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserView>> {
        let ids: Vec<Uuid> = user_ids.iter().map(UserId::value).collect();

        let rows = sqlx::query(
            r#"
            SELECT user_id, name, email
            FROM users
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_user_view).collect())
    }
}
