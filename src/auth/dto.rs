use std::fmt;

use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for issuing a reset token.
#[derive(Debug, Deserialize)]
pub struct ResetTokenRequest {
    pub email: String,
}

/// Request body for consuming a reset token.
#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub email: String,
    pub reset_token: String,
    pub new_password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for UpdatePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdatePasswordRequest")
            .field("email", &self.email)
            .field("reset_token", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}
