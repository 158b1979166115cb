use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use caseflow_core::PaginationMeta;
use caseflow_db::SqlValue;
use caseflow_rbac::{Module, RoleId};

/// SQL type of a writable column. Incoming JSON is checked against it and
/// bound with a matching cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Numeric,
    Text,
    Boolean,
    Date,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        }
    }

    /// Converts a JSON value into a bindable value for this column type.
    ///
    /// `null` is accepted for every type. The error is a short phrase meant
    /// to follow the column name (`"visit_date must be a date (YYYY-MM-DD)"`).
    pub fn bind(&self, value: &Value) -> Result<SqlValue, &'static str> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }

        match self {
            ColumnType::Integer => parse_integer(value)
                .filter(|n| i32::try_from(*n).is_ok())
                .map(SqlValue::Int)
                .ok_or("must be an integer"),
            ColumnType::BigInt => parse_integer(value)
                .map(SqlValue::Int)
                .ok_or("must be an integer"),
            ColumnType::Numeric => match value {
                Value::Number(n) => Ok(SqlValue::Text(n.to_string())),
                Value::String(s) if s.trim().parse::<f64>().is_ok_and(f64::is_finite) => {
                    Ok(SqlValue::Text(s.trim().to_string()))
                }
                _ => Err("must be a number"),
            },
            ColumnType::Text => match value {
                Value::String(s) => Ok(SqlValue::Text(s.clone())),
                Value::Number(n) => Ok(SqlValue::Text(n.to_string())),
                Value::Bool(b) => Ok(SqlValue::Text(b.to_string())),
                _ => Err("must be a string"),
            },
            ColumnType::Boolean => match value {
                Value::Bool(b) => Ok(SqlValue::Bool(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Ok(SqlValue::Bool(true)),
                    "false" | "0" | "no" => Ok(SqlValue::Bool(false)),
                    _ => Err("must be a boolean"),
                },
                Value::Number(n) => match n.as_i64() {
                    Some(1) => Ok(SqlValue::Bool(true)),
                    Some(0) => Ok(SqlValue::Bool(false)),
                    _ => Err("must be a boolean"),
                },
                _ => Err("must be a boolean"),
            },
            ColumnType::Date => value
                .as_str()
                .and_then(parse_date)
                .map(|d| SqlValue::Text(d.format("%Y-%m-%d").to_string()))
                .ok_or("must be a date (YYYY-MM-DD)"),
        }
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Plain dates, or the date part of a full timestamp as browsers send them.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
}

pub const fn col(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty }
}

/// Which column ties a row to a center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenterScope {
    /// The configured tenant column (`center_id` by default).
    TenantColumn,
    /// The row *is* a center; scope on its primary key.
    PrimaryKey,
}

/// Static description of one module's table.
#[derive(Debug)]
pub struct ResourceDef {
    pub module: Module,
    pub table: &'static str,
    /// Columns callers may write. `id`, the tenant column and the audit
    /// columns are managed by the service.
    pub columns: &'static [ColumnDef],
    /// Columns that may be used as exact-match query filters.
    pub filters: &'static [&'static str],
    /// Columns matched by `?search=`.
    pub searchable: &'static [&'static str],
    pub scope: CenterScope,
    /// Roles the module's routes are opened to.
    pub allowed_roles: &'static [RoleId],
    /// Rows created before centers were assigned have no center. When a
    /// filter narrows the list to one case file they stay visible.
    pub include_unassigned_when_filtered: bool,
}

/// Columns every table carries besides the writable ones.
pub const SYSTEM_COLUMNS: &[&str] = &["id", "created_at", "updated_at", "created_by", "updated_by"];

impl ResourceDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_tenant_scoped(&self) -> bool {
        self.scope == CenterScope::TenantColumn
    }

    /// Whether `?sort=<name>` is allowed.
    pub fn is_sortable(&self, name: &str, tenant_column: &str) -> bool {
        SYSTEM_COLUMNS.contains(&name)
            || self.column(name).is_some()
            || (self.is_tenant_scoped() && name == tenant_column)
    }
}

/// One page of records.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceList {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub meta: PaginationMeta,
}
