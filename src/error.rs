use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the user store and the auth service.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User {0} already exists")]
    UserExists(String),

    #[error("no matching user found")]
    NotFound,

    #[error("invalid lookup key: {0}")]
    InvalidPredicate(String),

    #[error("invalid user field: {0}")]
    InvalidField(String),

    #[error("email {0} is already taken")]
    DuplicateEmail(String),

    #[error("user store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthError::NotFound)
    }

    fn status(&self) -> StatusCode {
        match self {
            AuthError::UserExists(_) | AuthError::DuplicateEmail(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidPredicate(_) | AuthError::InvalidField(_) => StatusCode::BAD_REQUEST,
            AuthError::NotFound => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable(_) | AuthError::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AuthError::NotFound,
            other => AuthError::StoreUnavailable(other.into()),
        }
    }
}

/// Handler-facing form, matching the `(StatusCode, String)` rejections used by the routes.
impl From<AuthError> for (StatusCode, String) {
    fn from(e: AuthError) -> Self {
        let status = e.status();
        let message = match &e {
            AuthError::UserExists(_) | AuthError::DuplicateEmail(_) => {
                "email already registered".to_string()
            }
            AuthError::StoreUnavailable(_) | AuthError::Hashing(_) => {
                error!(error = %e, "internal auth failure");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, message)
    }
}
