use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tower_cookies::{Cookie, Cookies};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            LoginRequest, MessageResponse, ProfileResponse, RegisterRequest, ResetTokenRequest,
            ResetTokenResponse, UpdatePasswordRequest,
        },
        extractors::CurrentUser,
        password::MAX_PASSWORD_LEN,
    },
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str) -> Result<(), (StatusCode, String)> {
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), (StatusCode, String)> {
    if password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Password required".into()));
    }
    if password.len() > MAX_PASSWORD_LEN {
        warn!(len = password.len(), "password too long");
        return Err((StatusCode::BAD_REQUEST, "Password too long".into()));
    }
    Ok(())
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/sessions", post(login).delete(logout))
        .route("/reset_password", post(reset_token).put(update_password))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_string();
    check_email(&payload.email)?;
    check_password(&payload.password)?;

    let user = state
        .auth
        .register_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(MessageResponse {
        email: user.email,
        message: "user created".into(),
    }))
}

#[instrument(skip(state, cookies, payload))]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_string();

    // malformed and unknown emails get the same answer
    if !is_valid_email(&payload.email)
        || !state
            .auth
            .valid_login(&payload.email, &payload.password)
            .await?
    {
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let Some(session_id) = state.auth.create_session(&payload.email).await? else {
        // account vanished between the credential check and session creation
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    };

    let mut cookie = Cookie::new(state.config.session_cookie.clone(), session_id);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);

    info!(email = %payload.email, "user logged in");
    Ok(Json(MessageResponse {
        email: payload.email,
        message: "logged in".into(),
    }))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    CurrentUser(user): CurrentUser,
) -> Result<Redirect, (StatusCode, String)> {
    state.auth.destroy_session(user.id).await?;

    let mut cookie = Cookie::new(state.config.session_cookie.clone(), "");
    cookie.set_path("/");
    cookies.remove(cookie);

    Ok(Redirect::to("/"))
}

#[instrument(skip_all)]
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse { email: user.email })
}

#[instrument(skip(state, payload))]
pub async fn reset_token(
    State(state): State<AppState>,
    Json(mut payload): Json<ResetTokenRequest>,
) -> Result<Json<ResetTokenResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_string();

    let reset_token = state
        .auth
        .get_reset_password_token(&payload.email)
        .await?;

    Ok(Json(ResetTokenResponse {
        email: payload.email,
        reset_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    Json(mut payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_string();
    check_password(&payload.new_password)?;

    state
        .auth
        .update_password(&payload.reset_token, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse {
        email: payload.email,
        message: "Password updated".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, Response},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(AppState::in_memory())
    }

    fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::empty()).unwrap()
    }

    async fn body_json(res: Response<Body>) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// `name=value` pair from the response's Set-Cookie header.
    fn session_cookie(res: &Response<Body>) -> String {
        let raw = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    async fn register(app: &Router, email: &str, password: &str) -> Response<Body> {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/users",
                json!({ "email": email, "password": password }),
                None,
            ))
            .await
            .unwrap()
    }

    async fn login(app: &Router, email: &str, password: &str) -> Response<Body> {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/sessions",
                json!({ "email": email, "password": password }),
                None,
            ))
            .await
            .unwrap()
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[tokio::test]
    async fn welcome_route() {
        let res = app().oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["message"], "Bienvenue");
    }

    #[tokio::test]
    async fn register_and_duplicate() {
        let app = app();
        let res = register(&app, "a@b.com", "pw1").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["message"], "user created");

        let res = register(&app, "a@b.com", "pw1").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_rejects_bad_input() {
        let app = app();
        assert_eq!(
            register(&app, "nope", "pw1").await.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            register(&app, "a@b.com", "").await.status(),
            StatusCode::BAD_REQUEST
        );
        let long = "x".repeat(MAX_PASSWORD_LEN + 1);
        assert_eq!(
            register(&app, "a@b.com", &long).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn login_wrong_password_is_unauthorized() {
        let app = app();
        register(&app, "a@b.com", "pw1").await;
        assert_eq!(login(&app, "a@b.com", "pw2").await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(login(&app, "x@b.com", "pw1").await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_malformed_email_matches_unknown_email() {
        let app = app();
        let malformed = login(&app, "not-an-email", "pw1").await;
        let unknown = login(&app, "x@b.com", "pw1").await;
        assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        let malformed = to_bytes(malformed.into_body(), usize::MAX).await.unwrap();
        let unknown = to_bytes(unknown.into_body(), usize::MAX).await.unwrap();
        assert_eq!(malformed, unknown);
    }

    #[tokio::test]
    async fn login_profile_logout_flow() {
        let app = app();
        register(&app, "a@b.com", "pw1").await;

        let res = login(&app, "a@b.com", "pw1").await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);
        assert!(cookie.starts_with("session_id="));
        assert_eq!(body_json(res).await["message"], "logged in");

        let res = app
            .clone()
            .oneshot(get_request("/profile", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["email"], "a@b.com");

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/sessions")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");

        let res = app
            .clone()
            .oneshot(get_request("/profile", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn profile_and_logout_without_session_are_forbidden() {
        let app = app();
        let res = app.clone().oneshot(get_request("/profile", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/sessions")
                    .header(header::COOKIE, "session_id=bogus")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reset_password_flow() {
        let app = app();
        register(&app, "a@b.com", "old").await;

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/reset_password",
                json!({ "email": "unknown@b.com" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/reset_password",
                json!({ "email": "a@b.com" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let token = body_json(res).await["reset_token"]
            .as_str()
            .unwrap()
            .to_string();

        let update = json!({ "email": "a@b.com", "reset_token": token, "new_password": "new" });
        let res = app
            .clone()
            .oneshot(json_request("PUT", "/reset_password", update.clone(), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["message"], "Password updated");

        assert_eq!(login(&app, "a@b.com", "new").await.status(), StatusCode::OK);
        assert_eq!(login(&app, "a@b.com", "old").await.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .clone()
            .oneshot(json_request("PUT", "/reset_password", update, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn message_response_serialization() {
        let response = MessageResponse {
            email: "test@example.com".to_string(),
            message: "user created".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("user created"));
    }
}
