use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::password::HashedPassword;
use crate::auth::repo_types::{Lookup, User, UserUpdate};
use crate::error::AuthResult;

/// Persistence port for user records.
///
/// Implementations map missing records to [`AuthError::NotFound`] and
/// infrastructure failures to [`AuthError::StoreUnavailable`]; the auth
/// service relies on the two being distinct.
///
/// [`AuthError::NotFound`]: crate::error::AuthError::NotFound
/// [`AuthError::StoreUnavailable`]: crate::error::AuthError::StoreUnavailable
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user and assign its id.
    /// Fails with `DuplicateEmail` when the email is taken.
    async fn add_user(&self, email: &str, hashed_password: HashedPassword) -> AuthResult<User>;

    /// First user matching `lookup`, in a stable order.
    /// A blank lookup value is `NotFound` without touching storage.
    async fn find_user_by(&self, lookup: &Lookup) -> AuthResult<User>;

    /// Write the fields present in `update` to the user with `id`.
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> AuthResult<()>;
}
