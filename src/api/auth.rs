use crate::domain::{UserId, UserRole};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::error::ApiError;

/// 上流の認証ミドルウェアが設定する呼び出し元ユーザーIDのヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";

/// 上流の認証ミドルウェアが設定する呼び出し元ロールのヘッダー
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// 認証済みの呼び出し元（上流の認証ミドルウェアが設定）
///
/// ユーザーIDが欠けているか不正な場合は`ApiError::Unauthenticated`で拒否する。
/// ロールが欠けているか不明な場合は一般ユーザーとして扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: UserRole,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(UserId::from_uuid)
            .ok_or(ApiError::Unauthenticated)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserRole>().ok())
            .unwrap_or(UserRole::User);

        Ok(AuthUser { user_id, role })
    }
}
