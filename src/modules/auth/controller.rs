use axum::Json;
use axum::extract::State;
use tracing::instrument;

use caseflow_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::middleware::tenant::TenantContext;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{ErrorResponse, LoginRequest, LoginResponse, SessionResponse};
use super::service::AuthService;

/// Login and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account disabled", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Describe the current session
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Caller identity and data reach", body = SessionResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token carries no known role", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<SessionResponse>, AppError> {
    let ctx = TenantContext::from_claims(
        &auth_user.0,
        &state.roles,
        state.tenant_config.missing_center_policy,
    )?;

    Ok(Json(SessionResponse {
        user_id: auth_user.user_id()?,
        username: ctx.username,
        user_type: ctx.role.id(),
        role: ctx.role.name().to_string(),
        center_id: ctx.center_id,
        is_multi_center: ctx.is_multi_center,
    }))
}
