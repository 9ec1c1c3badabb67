use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::password::HashedPassword;
use crate::auth::repo::UserStore;
use crate::auth::repo_types::{Lookup, User, UserUpdate};
use crate::error::{AuthError, AuthResult};

/// Process-local store. Lookups scan in insertion order.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn add_user(&self, email: &str, hashed_password: HashedPassword) -> AuthResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::DuplicateEmail(email.to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password,
            session_id: None,
            reset_token: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        debug!(user_id = %user.id, "user stored in memory");
        Ok(user)
    }

    async fn find_user_by(&self, lookup: &Lookup) -> AuthResult<User> {
        if lookup.is_empty() {
            return Err(AuthError::NotFound);
        }
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| lookup.matches(u))
            .cloned()
            .ok_or(AuthError::NotFound)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> AuthResult<()> {
        let mut users = self.users.write().await;
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(AuthError::NotFound)?;
        if let Some(email) = &update.email {
            if users.iter().any(|u| u.id != id && u.email == *email) {
                return Err(AuthError::DuplicateEmail(email.clone()));
            }
        }
        update.apply(&mut users[idx]);
        Ok(())
    }
}
