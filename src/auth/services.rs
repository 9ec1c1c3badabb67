use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::UserStore;
use crate::auth::repo_types::{Lookup, User, UserUpdate};
use crate::auth::tokens::{new_reset_token, new_session_id};
use crate::error::{AuthError, AuthResult};

/// Registration, login, sessions and password resets on top of a [`UserStore`].
///
/// Lookup misses are folded into `false`/`None` where the caller only needs
/// an access-control answer. Store outages always propagate.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
}

/// `NotFound` becomes `None`; everything else passes through.
fn absent_on_miss<T>(res: AuthResult<T>) -> AuthResult<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(AuthError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, password))]
    pub async fn register_user(&self, email: &str, password: &str) -> AuthResult<User> {
        let lookup = Lookup::Email(email.to_string());
        if absent_on_miss(self.store.find_user_by(&lookup).await)?.is_some() {
            warn!("email already registered");
            return Err(AuthError::UserExists(email.to_string()));
        }

        let hashed = hash_password(password)?;
        // The store's uniqueness check closes the race between lookup and insert.
        let user = self
            .store
            .add_user(email, hashed)
            .await
            .map_err(|e| match e {
                AuthError::DuplicateEmail(email) => AuthError::UserExists(email),
                other => other,
            })?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn valid_login(&self, email: &str, password: &str) -> AuthResult<bool> {
        let lookup = Lookup::Email(email.to_string());
        let Some(user) = absent_on_miss(self.store.find_user_by(&lookup).await)? else {
            warn!("login unknown email");
            return Ok(false);
        };
        let ok = verify_password(&user.hashed_password, password);
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
        }
        Ok(ok)
    }

    /// Starts a session for `email`. An unknown email yields `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn create_session(&self, email: &str) -> AuthResult<Option<String>> {
        let lookup = Lookup::Email(email.to_string());
        let Some(user) = absent_on_miss(self.store.find_user_by(&lookup).await)? else {
            warn!("session requested for unknown email");
            return Ok(None);
        };
        let session_id = new_session_id();
        self.store
            .update_user(user.id, UserUpdate::default().session_id(Some(session_id.clone())))
            .await?;
        info!(user_id = %user.id, "session created");
        Ok(Some(session_id))
    }

    #[instrument(skip_all)]
    pub async fn get_user_from_session_id(
        &self,
        session_id: Option<&str>,
    ) -> AuthResult<Option<User>> {
        let Some(session_id) = session_id.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        absent_on_miss(
            self.store
                .find_user_by(&Lookup::SessionId(session_id.to_string()))
                .await,
        )
    }

    /// Clears the session of `user_id`. An unknown id is ignored.
    #[instrument(skip(self))]
    pub async fn destroy_session(&self, user_id: Uuid) -> AuthResult<()> {
        let res = self
            .store
            .update_user(user_id, UserUpdate::default().session_id(None))
            .await;
        match absent_on_miss(res)? {
            Some(()) => info!(%user_id, "session destroyed"),
            None => warn!(%user_id, "destroy_session for unknown user"),
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_reset_password_token(&self, email: &str) -> AuthResult<String> {
        let user = self
            .store
            .find_user_by(&Lookup::Email(email.to_string()))
            .await?;
        let token = new_reset_token();
        self.store
            .update_user(user.id, UserUpdate::default().reset_token(Some(token.clone())))
            .await?;
        info!(user_id = %user.id, "reset token issued");
        Ok(token)
    }

    /// Consumes `reset_token`: the new hash and the token removal land in one update.
    #[instrument(skip_all)]
    pub async fn update_password(&self, reset_token: &str, new_password: &str) -> AuthResult<()> {
        let user = self
            .store
            .find_user_by(&Lookup::ResetToken(reset_token.to_string()))
            .await?;
        let hashed = hash_password(new_password)?;
        self.store
            .update_user(
                user.id,
                UserUpdate::default().hashed_password(hashed).reset_token(None),
            )
            .await?;
        info!(user_id = %user.id, "password updated");
        Ok(())
    }
}
