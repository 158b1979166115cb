use std::collections::HashMap;

use anyhow::anyhow;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres};
use tracing::instrument;

use caseflow_core::{AppError, PaginationMeta, PaginationParams};
use caseflow_db::{ColumnRef, ColumnValue, ScopedQuery, SqlValue};

use crate::metrics::track_resource_write;
use crate::middleware::tenant::TenantContext;
use crate::modules::resources::model::{CenterScope, ResourceDef, ResourceList};

const ALIAS: &str = "t";

/// Maps database failures caused by the request data to client errors.
pub fn map_db_error(err: sqlx::Error) -> AppError {
    let code = err
        .as_database_error()
        .and_then(|e| e.code())
        .map(|c| c.into_owned());

    match code.as_deref() {
        Some("23505") => AppError::new(StatusCode::CONFLICT, anyhow!("Record already exists")),
        Some("23503") => {
            AppError::unprocessable(anyhow!("Referenced record does not exist"))
        }
        Some("23502") => AppError::unprocessable(anyhow!("A required field is missing")),
        Some("22P02" | "22007" | "22008" | "22003") => {
            AppError::unprocessable(anyhow!("A field has an invalid value"))
        }
        _ => AppError::database(err),
    }
}

/// Escapes `%`, `_` and `\` so the term matches literally inside ILIKE.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// A resource together with the column that ties its rows to a center.
pub struct Resource<'a> {
    pub def: &'a ResourceDef,
    pub tenant_column: &'a str,
}

impl<'a> Resource<'a> {
    pub fn new(def: &'a ResourceDef, tenant_column: &'a str) -> Self {
        Self { def, tenant_column }
    }

    fn scope_column_name(&self) -> &str {
        match self.def.scope {
            CenterScope::TenantColumn => self.tenant_column,
            CenterScope::PrimaryKey => "id",
        }
    }

    fn scope_column(&self, alias: Option<&str>) -> Result<ColumnRef, AppError> {
        Ok(ColumnRef::new(alias, self.scope_column_name())?)
    }

    fn label(&self) -> &'static str {
        self.def.module.name()
    }

    /// Filters, center narrowing, tenant scope and search; shared by the
    /// page query and its count.
    fn apply_list_predicates(
        &self,
        mut query: ScopedQuery,
        ctx: &TenantContext,
        params: &PaginationParams,
        filters: &HashMap<String, String>,
    ) -> Result<ScopedQuery, AppError> {
        let mut filtered = false;

        for name in self.def.filters {
            let Some(raw) = filters.get(*name) else {
                continue;
            };
            let Some(column) = self.def.column(name) else {
                continue;
            };
            let value = column
                .ty
                .bind(&Value::String(raw.clone()))
                .map_err(|e| AppError::bad_request(anyhow!("{} {}", name, e)))?;

            query = query.and_where_column_eq_as(
                &ColumnRef::new(Some(ALIAS), name)?,
                value,
                column.ty.sql_type(),
            );
            filtered = true;
        }

        if ctx.is_multi_center && self.def.is_tenant_scoped() {
            if let Some(raw) = filters.get(self.tenant_column) {
                let center_id: i32 = raw.trim().parse().map_err(|_| {
                    AppError::bad_request(anyhow!("{} must be an integer", self.tenant_column))
                })?;
                query = query
                    .and_where_column_eq(&self.scope_column(Some(ALIAS))?, SqlValue::from(center_id));
            }
        }

        let center_column = self.scope_column(Some(ALIAS))?;
        query = if self.def.include_unassigned_when_filtered && filtered {
            ctx.scope_including_unassigned(query, &center_column)?
        } else {
            ctx.scope(query, &center_column)?
        };

        if let Some(term) = params.search() {
            let columns = self
                .def
                .searchable
                .iter()
                .map(|name| ColumnRef::new(Some(ALIAS), name))
                .collect::<Result<Vec<_>, _>>()?;
            query = query.and_where_any_ilike(&columns, like_pattern(term));
        }

        Ok(query)
    }

    /// Checks body keys and binds each value. The tenant column is left to
    /// the caller.
    fn bind_body(&self, body: &Map<String, Value>) -> Result<Vec<ColumnValue>, AppError> {
        if body.is_empty() {
            return Err(AppError::unprocessable(anyhow!(
                "Request body has no fields to write"
            )));
        }

        let unknown: Vec<&str> = body
            .keys()
            .map(String::as_str)
            .filter(|key| {
                self.def.column(key).is_none()
                    && !(self.def.is_tenant_scoped() && *key == self.tenant_column)
            })
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::unprocessable(anyhow!(
                "Unknown field(s) for {}: {}",
                self.label(),
                unknown.join(", ")
            )));
        }

        let mut columns = Vec::with_capacity(body.len() + 2);
        for (key, value) in body {
            let Some(column) = self.def.column(key) else {
                continue;
            };
            let bound = column
                .ty
                .bind(value)
                .map_err(|e| AppError::unprocessable(anyhow!("{} {}", key, e)))?;
            columns.push(ColumnValue::new(key.clone(), bound).cast(column.ty.sql_type()));
        }

        Ok(columns)
    }

    /// Center id supplied in a write body, if any.
    fn body_center(&self, body: &Map<String, Value>) -> Result<Option<i32>, AppError> {
        match body.get(self.tenant_column) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => caseflow_core::serde::coerce_i32(value)
                .map(Some)
                .ok_or_else(|| {
                    AppError::unprocessable(anyhow!("{} must be an integer", self.tenant_column))
                }),
        }
    }
}

async fn fetch_json_rows(db: &PgPool, query: &ScopedQuery) -> Result<Vec<Value>, AppError> {
    let sql = query.text();
    sqlx::query_scalar_with::<Postgres, Value, _>(&sql, query.arguments()?)
        .fetch_all(db)
        .await
        .map_err(map_db_error)
}

async fn fetch_json_row(db: &PgPool, query: &ScopedQuery) -> Result<Option<Value>, AppError> {
    let sql = query.text();
    sqlx::query_scalar_with::<Postgres, Value, _>(&sql, query.arguments()?)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)
}

pub struct ResourceService;

impl ResourceService {
    #[instrument(skip(db, resource, ctx, filters), fields(module = resource.label(), username = %ctx.username))]
    pub async fn list(
        db: &PgPool,
        resource: &Resource<'_>,
        ctx: &TenantContext,
        params: &PaginationParams,
        filters: &HashMap<String, String>,
    ) -> Result<ResourceList, AppError> {
        let def = resource.def;

        let sort = params.sort();
        if !def.is_sortable(sort, resource.tenant_column) {
            return Err(AppError::bad_request(anyhow!(
                "Cannot sort {} by '{}'",
                resource.label(),
                sort
            )));
        }

        let count = resource.apply_list_predicates(
            ScopedQuery::count(def.table, ALIAS)?,
            ctx,
            params,
            filters,
        )?;
        let count_sql = count.text();
        let total: i64 = sqlx::query_scalar_with::<Postgres, i64, _>(&count_sql, count.arguments()?)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        let page = resource
            .apply_list_predicates(ScopedQuery::select_json(def.table, ALIAS)?, ctx, params, filters)?
            .order_by(&ColumnRef::new(Some(ALIAS), sort)?, params.order())
            .limit(params.limit())
            .offset(params.offset());

        let data = fetch_json_rows(db, &page).await?;

        Ok(ResourceList {
            data,
            meta: PaginationMeta::new(params, total),
        })
    }

    #[instrument(skip(db, resource, ctx), fields(module = resource.label(), username = %ctx.username))]
    pub async fn get(
        db: &PgPool,
        resource: &Resource<'_>,
        ctx: &TenantContext,
        id: i32,
    ) -> Result<Value, AppError> {
        let query = ScopedQuery::select_json(resource.def.table, ALIAS)?
            .and_where_column_eq(&ColumnRef::new(Some(ALIAS), "id")?, SqlValue::from(id));
        let query = ctx.scope(query, &resource.scope_column(Some(ALIAS))?)?;

        fetch_json_row(db, &query).await?.ok_or_else(|| {
            AppError::not_found(anyhow!("{} record {} not found", resource.label(), id))
        })
    }

    #[instrument(skip(db, resource, ctx, body), fields(module = resource.label(), username = %ctx.username))]
    pub async fn create(
        db: &PgPool,
        resource: &Resource<'_>,
        ctx: &TenantContext,
        body: Map<String, Value>,
    ) -> Result<Value, AppError> {
        let def = resource.def;
        let mut columns = resource.bind_body(&body)?;

        if def.is_tenant_scoped() {
            ctx.check_center()?;
            let center_id = match ctx.center_id {
                Some(own) if ctx.is_center_restricted() => Some(own),
                _ => resource.body_center(&body)?,
            };
            if let Some(center_id) = center_id {
                columns.push(ColumnValue::new(resource.tenant_column, center_id).cast("integer"));
            }
        }

        columns.push(ColumnValue::new("created_by", ctx.username.clone()));

        let query = ScopedQuery::insert(def.table, columns)?.returning_json(def.table)?;
        let row = fetch_json_row(db, &query)
            .await?
            .ok_or_else(|| AppError::internal_error("Insert returned no row".to_string()))?;

        track_resource_write(resource.label(), "create");
        tracing::info!(table = def.table, "Record created");

        Ok(row)
    }

    #[instrument(skip(db, resource, ctx, body), fields(module = resource.label(), username = %ctx.username))]
    pub async fn update(
        db: &PgPool,
        resource: &Resource<'_>,
        ctx: &TenantContext,
        id: i32,
        body: Map<String, Value>,
    ) -> Result<Value, AppError> {
        let def = resource.def;
        let mut columns = resource.bind_body(&body)?;

        if def.is_tenant_scoped() && body.contains_key(resource.tenant_column) {
            let requested = resource.body_center(&body)?;
            if ctx.is_center_restricted() {
                if requested != ctx.center_id {
                    return Err(AppError::forbidden(
                        "Access denied. Records cannot be moved between centers".to_string(),
                    ));
                }
            } else {
                columns.push(
                    ColumnValue::new(resource.tenant_column, requested).cast("integer"),
                );
            }
        }

        columns.push(ColumnValue::new("updated_by", ctx.username.clone()));
        columns.push(
            ColumnValue::new("updated_at", Utc::now().to_rfc3339()).cast("timestamptz"),
        );

        let query = ScopedQuery::update(def.table, columns)?
            .and_where_column_eq(&ColumnRef::new(None, "id")?, SqlValue::from(id));
        let query = ctx
            .scope(query, &resource.scope_column(None)?)?
            .returning_json(def.table)?;

        let row = fetch_json_row(db, &query).await?.ok_or_else(|| {
            AppError::not_found(anyhow!("{} record {} not found", resource.label(), id))
        })?;

        track_resource_write(resource.label(), "update");
        Ok(row)
    }

    #[instrument(skip(db, resource, ctx), fields(module = resource.label(), username = %ctx.username))]
    pub async fn delete(
        db: &PgPool,
        resource: &Resource<'_>,
        ctx: &TenantContext,
        id: i32,
    ) -> Result<(), AppError> {
        let query = ScopedQuery::delete(resource.def.table)?
            .and_where_column_eq(&ColumnRef::new(None, "id")?, SqlValue::from(id));
        let query = ctx.scope(query, &resource.scope_column(None)?)?;

        let sql = query.text();
        let result = sqlx::query_with::<Postgres, _>(&sql, query.arguments()?)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(
                "{} record {} not found",
                resource.label(),
                id
            )));
        }

        track_resource_write(resource.label(), "delete");
        Ok(())
    }
}
