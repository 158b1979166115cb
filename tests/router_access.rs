//! Requests that are answered before any SQL runs, driven against an app
//! whose pool never connects.

mod common;

use axum::http::StatusCode;
use caseflow_config::{MissingCenterPolicy, TenantConfig};
use caseflow_rbac::RoleId;
use common::{lazy_app, send, token_for, token_with_claims};
use serde_json::json;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = lazy_app(TenantConfig::default());

    let (status, body) = send(&app, "GET", "/api/tasks", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_bad_signature_is_unauthorized() {
    let app = lazy_app(TenantConfig::default());
    let (status, _) = send(
        &app,
        "GET",
        "/api/applicantDetails",
        Some("not.a.token"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_executive_cannot_delete() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::OrgExecutive, Some(1));

    let (status, body) = send(&app, "DELETE", "/api/tasks/1", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "method_not_allowed");
    assert_eq!(body["role"], "Org Executive");
}

#[tokio::test]
async fn test_executive_cannot_create() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::OrgExecutive, Some(1));

    let (status, body) = send(
        &app,
        "POST",
        "/api/comments",
        Some(&token),
        Some(json!({"comment": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "method_not_allowed");
}

#[tokio::test]
async fn test_caseworker_is_kept_out_of_staff_modules() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::OrgCaseworker, Some(1));

    for path in [
        "/api/employee",
        "/api/inventoryItems",
        "/api/supplierProfile",
        "/api/centerDetail",
    ] {
        let (status, body) = send(&app, "GET", path, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", path);
        assert_eq!(body["reason"], "role_not_allowed", "{}", path);
    }
}

#[tokio::test]
async fn test_executive_is_kept_out_of_employee_records() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::OrgExecutive, Some(1));

    for path in ["/api/employee", "/api/employee/3"] {
        let (status, body) = send(&app, "GET", path, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", path);
        assert_eq!(body["reason"], "role_not_allowed", "{}", path);
        assert_eq!(body["role"], "Org Executive");
    }
}

#[tokio::test]
async fn test_hq_cannot_manage_centers() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::Hq, None);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/centerDetail/1",
        Some(&token),
        Some(json!({"organisation_name": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "management_restricted");

    let (status, _) = send(
        &app,
        "POST",
        "/api/centerDetail",
        Some(&token),
        Some(json!({"organisation_name": "New"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_without_role_is_forbidden() {
    let app = lazy_app(TenantConfig::default());
    let token = token_with_claims(None, Some(1));

    let (status, body) = send(&app, "GET", "/api/tasks", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "missing_role");
}

#[tokio::test]
async fn test_unknown_role_is_forbidden() {
    let app = lazy_app(TenantConfig::default());
    let token = token_with_claims(Some(42), Some(1));

    let (status, body) = send(&app, "GET", "/api/tasks", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "unknown_role");
    assert!(body["role"].is_null());
}

#[tokio::test]
async fn test_deny_policy_refuses_caller_without_center() {
    let app = lazy_app(TenantConfig {
        missing_center_policy: MissingCenterPolicy::Deny,
        ..TenantConfig::default()
    });
    let token = token_for(RoleId::OrgCaseworker, None);

    let (status, body) = send(&app, "GET", "/api/tasks", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Access denied. No center assigned to this account"
    );
}

#[tokio::test]
async fn test_unknown_sort_column_is_rejected() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::OrgAdmin, Some(1));

    let (status, _) = send(
        &app,
        "GET",
        "/api/tasks?sort=password_hash",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::OrgAdmin, Some(1));

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!(["not", "an", "object"])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request body must be a JSON object");
}

#[tokio::test]
async fn test_unknown_field_is_rejected_before_insert() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::OrgCaseworker, Some(1));

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({"task_description": "Call back", "is_admin": true})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("is_admin"));
}

#[tokio::test]
async fn test_session_describes_caller() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::Hq, None);

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "HQ");
    assert_eq!(body["is_multi_center"], true);
    assert!(body["center_id"].is_null());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = lazy_app(TenantConfig::default());
    let token = token_for(RoleId::AppAdmin, None);

    let (status, body) = send(&app, "GET", "/api/students", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn test_login_validation_runs_before_lookup() {
    let app = lazy_app(TenantConfig::default());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "", "password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "thandi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password is required");
}
