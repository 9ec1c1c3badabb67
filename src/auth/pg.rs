use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::error;
use uuid::Uuid;

use crate::auth::password::HashedPassword;
use crate::auth::repo::UserStore;
use crate::auth::repo_types::{Lookup, User, UserRow, UserUpdate};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = "id, email, hashed_password, session_id, reset_token, created_at";

/// `users` table in PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Maps a failed write, turning a unique-index hit on `email` into `DuplicateEmail`.
fn write_error(e: sqlx::Error, email: &str) -> AuthError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AuthError::DuplicateEmail(email.to_string())
        }
        _ => {
            error!(error = %e, "users write failed");
            e.into()
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn add_user(&self, email: &str, hashed_password: HashedPassword) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password.into_inner())
        .fetch_one(&self.db)
        .await
        .map_err(|e| write_error(e, email))?;
        Ok(row.into())
    }

    async fn find_user_by(&self, lookup: &Lookup) -> AuthResult<User> {
        if lookup.is_empty() {
            return Err(AuthError::NotFound);
        }
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users WHERE "));
        qb.push(lookup.column()).push(" = ");
        match lookup {
            Lookup::Email(v) | Lookup::SessionId(v) | Lookup::ResetToken(v) => {
                qb.push_bind(v.clone())
            }
            Lookup::Id(id) => qb.push_bind(*id),
        };
        qb.push(" ORDER BY created_at, id LIMIT 1");

        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, column = lookup.column(), "users lookup failed");
                AuthError::from(e)
            })?;
        row.map(User::from).ok_or(AuthError::NotFound)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> AuthResult<()> {
        if update.is_empty() {
            return self.find_user_by(&Lookup::Id(id)).await.map(|_| ());
        }
        let email = update.email.clone().unwrap_or_default();

        // Only the supplied columns are written, so concurrent updates to
        // other fields of the same row survive.
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(v) = update.email {
                set.push("email = ").push_bind_unseparated(v);
            }
            if let Some(v) = update.hashed_password {
                set.push("hashed_password = ").push_bind_unseparated(v.into_inner());
            }
            if let Some(v) = update.session_id {
                set.push("session_id = ").push_bind_unseparated(v);
            }
            if let Some(v) = update.reset_token {
                set.push("reset_token = ").push_bind_unseparated(v);
            }
        }
        qb.push(" WHERE id = ").push_bind(id);

        let done = qb
            .build()
            .execute(&self.db)
            .await
            .map_err(|e| write_error(e, &email))?;
        if done.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }
}
