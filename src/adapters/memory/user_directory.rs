use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait, UserView};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// UserDirectoryのインメモリ実装
pub struct UserDirectory {
    users: Mutex<Vec<UserView>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }

    /// ユーザーを登録
    pub fn add_user(&self, user: UserView) {
        self.lock().push(user);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<UserView>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn find_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserView>> {
        Ok(self
            .lock()
            .iter()
            .filter(|user| user_ids.contains(&user.user_id))
            .cloned()
            .collect())
    }
}
