use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::password::HashedPassword;
use crate::error::{AuthError, AuthResult};

/// User record as seen by the auth service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,                          // assigned by the store
    pub email: String,                     // unique
    pub hashed_password: HashedPassword,   // argon2 PHC string
    pub session_id: Option<String>,        // set while logged in
    pub reset_token: Option<String>,       // set while a reset is pending
    #[allow(dead_code)]
    pub created_at: OffsetDateTime,
}

/// Raw `users` row.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub session_id: Option<String>,
    pub reset_token: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            hashed_password: HashedPassword::from_stored(r.hashed_password),
            session_id: r.session_id,
            reset_token: r.reset_token,
            created_at: r.created_at,
        }
    }
}

/// Single-field predicate for [`UserStore::find_user_by`](crate::auth::repo::UserStore::find_user_by).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Email(String),
    Id(Uuid),
    SessionId(String),
    ResetToken(String),
}

impl Lookup {
    /// Builds a predicate from a `key = value` pair. This and [`UserUpdate::set`]
    /// are the string-keyed entry points of the store contract; the service
    /// itself builds typed values directly.
    ///
    /// Unknown keys fail with [`AuthError::InvalidPredicate`]. An `id` that is
    /// not a UUID cannot match any record and fails with [`AuthError::NotFound`].
    #[allow(dead_code)]
    pub fn parse(key: &str, value: &str) -> AuthResult<Self> {
        match key {
            "email" => Ok(Lookup::Email(value.to_string())),
            "id" => Uuid::parse_str(value)
                .map(Lookup::Id)
                .map_err(|_| AuthError::NotFound),
            "session_id" => Ok(Lookup::SessionId(value.to_string())),
            "reset_token" => Ok(Lookup::ResetToken(value.to_string())),
            other => Err(AuthError::InvalidPredicate(other.to_string())),
        }
    }

    /// True when the predicate value is blank; stores answer `NotFound` without a lookup.
    pub fn is_empty(&self) -> bool {
        match self {
            Lookup::Email(v) | Lookup::SessionId(v) | Lookup::ResetToken(v) => v.is_empty(),
            Lookup::Id(id) => id.is_nil(),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Lookup::Email(_) => "email",
            Lookup::Id(_) => "id",
            Lookup::SessionId(_) => "session_id",
            Lookup::ResetToken(_) => "reset_token",
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        match self {
            Lookup::Email(v) => user.email == *v,
            Lookup::Id(id) => user.id == *id,
            Lookup::SessionId(v) => user.session_id.as_deref() == Some(v.as_str()),
            Lookup::ResetToken(v) => user.reset_token.as_deref() == Some(v.as_str()),
        }
    }
}

/// Partial set of user fields to write.
///
/// Outer `None` leaves a field untouched; for the optional fields `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub hashed_password: Option<HashedPassword>,
    pub session_id: Option<Option<String>>,
    pub reset_token: Option<Option<String>>,
}

impl UserUpdate {
    pub fn session_id(mut self, value: Option<String>) -> Self {
        self.session_id = Some(value);
        self
    }

    pub fn reset_token(mut self, value: Option<String>) -> Self {
        self.reset_token = Some(value);
        self
    }

    pub fn hashed_password(mut self, value: HashedPassword) -> Self {
        self.hashed_password = Some(value);
        self
    }

    /// Sets a field by name. `None` clears it; `email` cannot be cleared.
    /// `hashed_password` is rejected here: digests only come from the hasher
    /// through [`UserUpdate::hashed_password`].
    #[allow(dead_code)]
    pub fn set(&mut self, key: &str, value: Option<String>) -> AuthResult<()> {
        match (key, value) {
            ("email", Some(v)) => self.email = Some(v),
            ("session_id", v) => self.session_id = Some(v),
            ("reset_token", v) => self.reset_token = Some(v),
            (other, _) => return Err(AuthError::InvalidField(other.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.hashed_password.is_none()
            && self.session_id.is_none()
            && self.reset_token.is_none()
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hash) = &self.hashed_password {
            user.hashed_password = hash.clone();
        }
        if let Some(session_id) = &self.session_id {
            user.session_id = session_id.clone();
        }
        if let Some(reset_token) = &self.reset_token {
            user.reset_token = reset_token.clone();
        }
    }
}
