use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,
}

/// Response model for a successful login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed bearer token for subsequent requests
    pub token: String,

    /// Identity id (UUID)
    pub identity_id: String,

    pub username: String,

    pub email: String,

    /// Role name in wire form
    pub role: String,
}

/// Request model for starting a password reset
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Email of the account to reset
    pub email: String,
}

/// Request model for completing a password reset
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    /// Opaque reset token from the emailed link
    pub token: String,

    pub new_password: String,

    pub confirm_password: String,
}

/// Response model for the reset-token pre-check
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ResetTokenValidity {
    /// Whether the token currently passes the validity predicate
    pub valid: bool,
}
