use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Row read when checking credentials.
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub user_type: i32,
    pub center_id: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub user_type: i32,
    /// Display name of the role, absent for ids outside the role table.
    pub role: Option<String>,
    pub center_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Who the bearer token says the caller is, and what it lets them see.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: i32,
    pub username: String,
    pub user_type: i32,
    pub role: String,
    pub center_id: Option<i32>,
    pub is_multi_center: bool,
}

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
