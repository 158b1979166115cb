use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use caseflow_auth::{Claims, verify_token};
use caseflow_core::AppError;

use crate::state::AppState;

/// Extractor that validates the bearer token and provides its claims.
///
/// When [`crate::middleware::role::require_roles`] already ran for the
/// request, the verified user is taken from the request extensions instead
/// of decoding the token a second time.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }

    pub fn role_id(&self) -> Option<i32> {
        self.0.user_type
    }

    pub fn center_id(&self) -> Option<i32> {
        self.0.center_id
    }

    pub fn user_id(&self) -> Result<i32, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token.trim(), &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}
