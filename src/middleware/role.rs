//! Role-based authorization middleware.
//!
//! [`require_roles`] is mounted with `axum::middleware::from_fn_with_state`
//! on each module router, with the roles that router was opened to:
//!
//! ```rust,ignore
//! use axum::{extract::{Request, State}, middleware::{self, Next}};
//! use caseflow_rbac::RoleId;
//!
//! const CASE_ROLES: &[RoleId] = &[RoleId::Hq, RoleId::OrgAdmin, RoleId::OrgCaseworker];
//!
//! let router = init_tasks_router().route_layer(middleware::from_fn_with_state(
//!     state.clone(),
//!     |state: State<AppState>, req: Request, next: Next| {
//!         require_roles(state, req, next, CASE_ROLES)
//!     },
//! ));
//! ```

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use caseflow_core::AppError;
use caseflow_rbac::{Denial, RoleId};

use crate::metrics::track_rbac_denial;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Authenticates the caller and checks the role table for this request.
///
/// On success the verified [`AuthUser`] is stored in the request extensions
/// for the extractors that run after it, and in the response extensions for
/// the outer logging layer.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &'static [RoleId],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let Some(role_id) = auth_user.role_id() else {
        track_rbac_denial("missing_role");
        tracing::warn!(
            username = %auth_user.username(),
            path = %path,
            "Token carries no role"
        );
        return Ok(denied_response(None, "missing_role", "Access denied. No role assigned"));
    };

    if let Err(denial) = state
        .roles
        .authorize(role_id, allowed_roles, &parts.method, &path)
    {
        track_rbac_denial(denial.reason());
        tracing::warn!(
            username = %auth_user.username(),
            role_id,
            method = %parts.method,
            path = %path,
            reason = denial.reason(),
            "Authorization denied"
        );
        return Ok(denial_response(&denial));
    }

    parts.extensions.insert(auth_user.clone());

    let mut response = next.run(Request::from_parts(parts, body)).await;
    // Lets the logging layer name the caller on slow requests.
    response.extensions_mut().insert(auth_user);
    Ok(response)
}

fn denial_role(denial: &Denial) -> Option<RoleId> {
    match denial {
        Denial::UnknownRole(_) => None,
        Denial::RoleNotAllowed { role, .. }
        | Denial::MethodNotAllowed { role, .. }
        | Denial::ModuleNotAllowed { role, .. }
        | Denial::ManagementRestricted { role, .. } => Some(*role),
    }
}

fn denial_response(denial: &Denial) -> Response {
    denied_response(denial_role(denial), denial.reason(), &denial.to_string())
}

fn denied_response(role: Option<RoleId>, reason: &str, message: &str) -> Response {
    let body = json!({
        "error": message,
        "reason": reason,
        "role": role.map(|r| r.name()),
    });

    (StatusCode::FORBIDDEN, Json(body)).into_response()
}
