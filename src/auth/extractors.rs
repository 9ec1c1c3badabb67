use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tower_cookies::Cookies;
use tracing::warn;

use crate::auth::repo_types::User;
use crate::state::AppState;

/// Resolves the session cookie to its user; rejects with 403 when there is none.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, msg.to_string()))?;

        let session_id = cookies
            .get(&state.config.session_cookie)
            .map(|c| c.value().to_string());

        match state
            .auth
            .get_user_from_session_id(session_id.as_deref())
            .await?
        {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!("no active session");
                Err((StatusCode::FORBIDDEN, "Forbidden".into()))
            }
        }
    }
}
