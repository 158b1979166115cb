//! Handlers shared by every module served from the resource registry.
//!
//! Each module router carries its [`ResourceDef`] as an extension, so one set
//! of handlers serves `/api/applicantDetails`, `/api/tasks` and the rest.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::Value;
use tracing::instrument;

use caseflow_core::{AppError, PaginationParams};

use crate::middleware::tenant::TenantContext;
use crate::modules::resources::model::{ResourceDef, ResourceList};
use crate::modules::resources::service::{Resource, ResourceService};
use crate::state::AppState;
use crate::validator::JsonObject;

#[utoipa::path(
    get,
    path = "/api/{resource}",
    params(
        ("resource" = String, Path, description = "Module route segment, e.g. tasks or applicantDetails"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Page of records visible to the caller", body = ResourceList),
        (status = 400, description = "Unknown sort column or malformed filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not read this module")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, def, filters), fields(module = %def.module))]
pub async fn list_records(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    ctx: TenantContext,
    Query(params): Query<PaginationParams>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<Json<ResourceList>, AppError> {
    let resource = Resource::new(def, &state.tenant_config.column);
    let page = ResourceService::list(&state.db, &resource, &ctx, &params, &filters).await?;

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Module route segment"),
        ("id" = i32, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Record", body = Value),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not read this module"),
        (status = 404, description = "Record not found or belongs to another center")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, def), fields(module = %def.module))]
pub async fn get_record(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    ctx: TenantContext,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let resource = Resource::new(def, &state.tenant_config.column);
    let record = ResourceService::get(&state.db, &resource, &ctx, id).await?;

    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/api/{resource}",
    params(
        ("resource" = String, Path, description = "Module route segment")
    ),
    request_body = Value,
    responses(
        (status = 201, description = "Record created in the caller's center", body = Value),
        (status = 400, description = "Body is not a JSON object"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not write this module"),
        (status = 409, description = "Record already exists"),
        (status = 422, description = "Unknown field or invalid value")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, def, body), fields(module = %def.module))]
pub async fn create_record(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    ctx: TenantContext,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let resource = Resource::new(def, &state.tenant_config.column);
    let record = ResourceService::create(&state.db, &resource, &ctx, body).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/api/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Module route segment"),
        ("id" = i32, Path, description = "Record ID")
    ),
    request_body = Value,
    responses(
        (status = 200, description = "Updated record", body = Value),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not write this module, or the record would move to another center"),
        (status = 404, description = "Record not found or belongs to another center"),
        (status = 422, description = "Unknown field or invalid value")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, def, body), fields(module = %def.module))]
pub async fn update_record(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    ctx: TenantContext,
    Path(id): Path<i32>,
    JsonObject(body): JsonObject,
) -> Result<Json<Value>, AppError> {
    let resource = Resource::new(def, &state.tenant_config.column);
    let record = ResourceService::update(&state.db, &resource, &ctx, id, body).await?;

    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Module route segment"),
        ("id" = i32, Path, description = "Record ID")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not delete in this module"),
        (status = 404, description = "Record not found or belongs to another center")
    ),
    tag = "Resources",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, def), fields(module = %def.module))]
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(def): Extension<&'static ResourceDef>,
    ctx: TenantContext,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let resource = Resource::new(def, &state.tenant_config.column);
    ResourceService::delete(&state.db, &resource, &ctx, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
