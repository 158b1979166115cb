//! Per-request tenant context.
//!
//! [`inject_tenant_context`] runs after [`super::role::require_roles`] and
//! turns the verified claims into a [`TenantContext`]. Handlers extract it
//! and pass every query through [`TenantContext::scope`] before running it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use caseflow_auth::Claims;
use caseflow_config::MissingCenterPolicy;
use caseflow_core::AppError;
use caseflow_db::{ColumnRef, ScopeOptions, ScopedQuery, SqlValue, scope_query};
use caseflow_rbac::{RoleId, RoleTable};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub center_id: Option<i32>,
    /// App Admin and HQ see every center.
    pub is_multi_center: bool,
    pub role: RoleId,
    pub username: String,
    pub missing_center_policy: MissingCenterPolicy,
}

impl TenantContext {
    pub fn from_claims(
        claims: &Claims,
        roles: &RoleTable,
        missing_center_policy: MissingCenterPolicy,
    ) -> Result<Self, AppError> {
        let role_id = claims
            .user_type
            .ok_or_else(|| AppError::forbidden("Access denied. No role assigned".to_string()))?;
        let role = RoleId::try_from(role_id)
            .map_err(|e| AppError::forbidden(format!("Access denied. {}", e)))?;

        Ok(Self {
            center_id: claims.center_id,
            is_multi_center: roles.is_multi_center(role_id),
            role,
            username: claims.username.clone(),
            missing_center_policy,
        })
    }

    /// Whether queries run by this caller get a center predicate.
    pub fn is_center_restricted(&self) -> bool {
        !self.is_multi_center
    }

    pub fn scope_options(&self, column: &ColumnRef) -> ScopeOptions {
        ScopeOptions {
            center_id: self.center_id,
            is_super_admin: self.is_multi_center,
            column: column.clone(),
            enforce: self.is_center_restricted(),
        }
    }

    /// Restricts `query` to the caller's center on `column`.
    ///
    /// A center-restricted caller without a center is refused when the
    /// policy is [`MissingCenterPolicy::Deny`]; under `Allow` the query is
    /// returned unscoped.
    pub fn scope(
        &self,
        query: impl Into<ScopedQuery>,
        column: &ColumnRef,
    ) -> Result<ScopedQuery, AppError> {
        self.check_center()?;
        Ok(scope_query(query, &self.scope_options(column)))
    }

    /// Like [`Self::scope`], but rows with no center at all stay visible.
    pub fn scope_including_unassigned(
        &self,
        query: impl Into<ScopedQuery>,
        column: &ColumnRef,
    ) -> Result<ScopedQuery, AppError> {
        self.check_center()?;
        let query = query.into();

        match self.center_id {
            Some(center_id) if self.is_center_restricted() => {
                Ok(query.and_where_column_eq_or_null(column, SqlValue::from(center_id)))
            }
            _ => Ok(scope_query(query, &self.scope_options(column))),
        }
    }

    /// Rejects a center-restricted caller with no center when the policy is
    /// `deny`.
    pub fn check_center(&self) -> Result<(), AppError> {
        if self.is_center_restricted()
            && self.center_id.is_none()
            && self.missing_center_policy == MissingCenterPolicy::Deny
        {
            tracing::warn!(
                username = %self.username,
                role = %self.role,
                "Center-restricted caller has no center"
            );
            return Err(AppError::forbidden(
                "Access denied. No center assigned to this account".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derives the caller's [`TenantContext`] and stores it in the request
/// extensions.
pub async fn inject_tenant_context(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let context = TenantContext::from_claims(
        &auth_user.0,
        &state.roles,
        state.tenant_config.missing_center_policy,
    )?;

    tracing::debug!(
        username = %context.username,
        role = %context.role,
        center_id = ?context.center_id,
        is_multi_center = context.is_multi_center,
        "Tenant context attached"
    );

    parts.extensions.insert(context);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or_else(|| AppError::internal_error("Tenant context not initialized".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(user_type: Option<i32>, center_id: Option<i32>) -> Claims {
        Claims {
            sub: "7".to_string(),
            username: "lerato".to_string(),
            user_type,
            center_id,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    fn context(user_type: i32, center_id: Option<i32>, policy: MissingCenterPolicy) -> TenantContext {
        TenantContext::from_claims(
            &claims(Some(user_type), center_id),
            &RoleTable::standard(),
            policy,
        )
        .unwrap()
    }

    fn center_column() -> ColumnRef {
        ColumnRef::new(Some("t"), "center_id").unwrap()
    }

    #[test]
    fn test_from_claims() {
        let ctx = context(3, Some(4), MissingCenterPolicy::Allow);
        assert_eq!(ctx.role, RoleId::OrgAdmin);
        assert_eq!(ctx.center_id, Some(4));
        assert!(!ctx.is_multi_center);
        assert_eq!(ctx.username, "lerato");

        assert!(context(1, None, MissingCenterPolicy::Allow).is_multi_center);
        assert!(context(2, Some(1), MissingCenterPolicy::Allow).is_multi_center);
    }

    #[test]
    fn test_from_claims_rejects_missing_or_unknown_role() {
        let roles = RoleTable::standard();

        let err = TenantContext::from_claims(&claims(None, Some(1)), &roles, MissingCenterPolicy::Allow)
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);

        let err = TenantContext::from_claims(&claims(Some(9), Some(1)), &roles, MissingCenterPolicy::Allow)
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_restricted_caller_is_scoped() {
        let ctx = context(5, Some(11), MissingCenterPolicy::Allow);

        let scoped = ctx
            .scope(ScopedQuery::select_json("tasks", "t").unwrap(), &center_column())
            .unwrap();

        assert_eq!(
            scoped.text(),
            "SELECT to_jsonb(t.*) AS data FROM tasks t WHERE t.center_id = $1"
        );
        assert_eq!(scoped.values(), &[SqlValue::Int(11)]);
    }

    #[test]
    fn test_multi_center_caller_is_not_scoped() {
        for role in [1, 2] {
            let ctx = context(role, Some(3), MissingCenterPolicy::Deny);
            let base = ScopedQuery::select_json("tasks", "t").unwrap();

            let scoped = ctx.scope(&base, &center_column()).unwrap();

            assert_eq!(scoped, base);
        }
    }

    #[test]
    fn test_missing_center_allow_policy_runs_unscoped() {
        let ctx = context(4, None, MissingCenterPolicy::Allow);
        let base = ScopedQuery::select_json("tasks", "t").unwrap();

        let scoped = ctx.scope(&base, &center_column()).unwrap();

        assert_eq!(scoped, base);
    }

    #[test]
    fn test_missing_center_deny_policy_refuses() {
        let ctx = context(4, None, MissingCenterPolicy::Deny);

        let err = ctx
            .scope(ScopedQuery::select_json("tasks", "t").unwrap(), &center_column())
            .unwrap_err();

        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_scope_including_unassigned() {
        let ctx = context(5, Some(6), MissingCenterPolicy::Allow);
        let base = ScopedQuery::select_json("tasks", "t")
            .unwrap()
            .and_where_eq("file_id", 2)
            .unwrap();

        let scoped = ctx.scope_including_unassigned(base, &center_column()).unwrap();

        assert!(scoped
            .text()
            .ends_with("WHERE file_id = $1 AND (t.center_id IS NULL OR t.center_id = $2)"));
    }
}
