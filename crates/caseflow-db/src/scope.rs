//! Center scoping for outgoing queries.
//!
//! [`scope_query`] takes any statement and, when the caller is tied to a
//! single center, appends exactly one `<column> = $n` predicate bound to that
//! center. Everything else about the statement is left as it was.

use crate::error::QueryError;
use crate::query::{ColumnRef, ScopedQuery, SqlValue};

pub const DEFAULT_TENANT_COLUMN: &str = "center_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOptions {
    pub center_id: Option<i32>,
    pub is_super_admin: bool,
    pub column: ColumnRef,
    /// When false the query is returned untouched.
    pub enforce: bool,
}

impl ScopeOptions {
    /// Enforced scoping on the default `center_id` column.
    pub fn for_center(center_id: Option<i32>) -> Self {
        Self {
            center_id,
            is_super_admin: false,
            column: ColumnRef::unchecked(DEFAULT_TENANT_COLUMN),
            enforce: true,
        }
    }

    pub fn with_column(mut self, alias: Option<&str>, column: &str) -> Result<Self, QueryError> {
        self.column = ColumnRef::new(alias, column)?;
        Ok(self)
    }

    pub fn super_admin(mut self, is_super_admin: bool) -> Self {
        self.is_super_admin = is_super_admin;
        self
    }

    pub fn enforce(mut self, enforce: bool) -> Self {
        self.enforce = enforce;
        self
    }
}

/// Restricts `query` to the caller's center.
///
/// Returns the input unchanged when scoping is not enforced or the caller is
/// a super admin. Otherwise one predicate and one bound value are appended to
/// a copy; the caller's own query and value list are never modified.
///
/// A caller with no center comes back unscoped. Callers that must not see
/// other centers' data have to reject a missing center before getting here.
pub fn scope_query(query: impl Into<ScopedQuery>, options: &ScopeOptions) -> ScopedQuery {
    let query = query.into();

    if !options.enforce || options.is_super_admin {
        return query;
    }

    let Some(center_id) = options.center_id else {
        tracing::warn!(
            column = options.column.as_str(),
            "scope requested without a center id, returning query unscoped"
        );
        return query;
    };

    query.and_where_column_eq(&options.column, SqlValue::from(center_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(center_id: Option<i32>) -> ScopeOptions {
        ScopeOptions::for_center(center_id)
    }

    #[test]
    fn test_scopes_query_without_filters() {
        let scoped = scope_query(ScopedQuery::raw("SELECT * FROM tasks").unwrap(), &opts(Some(7)));

        assert_eq!(scoped.text(), "SELECT * FROM tasks WHERE center_id = $1");
        assert_eq!(scoped.values(), &[SqlValue::Int(7)]);
    }

    #[test]
    fn test_scopes_query_with_existing_filter() {
        let base = ScopedQuery::select("comments")
            .unwrap()
            .and_where_eq("id", 5)
            .unwrap();

        let scoped = scope_query(&base, &opts(Some(2)));

        assert_eq!(
            scoped.text(),
            "SELECT * FROM comments WHERE id = $1 AND center_id = $2"
        );
        assert_eq!(scoped.values(), &[SqlValue::Int(5), SqlValue::Int(2)]);
    }

    #[test]
    fn test_existing_values_get_next_placeholder() {
        let base = ScopedQuery::try_from((
            "SELECT * FROM tasks t JOIN applicant_details a ON a.id = t.file_id AND a.status = $1",
            vec![SqlValue::from("Active")],
        ))
        .unwrap();

        let scoped = scope_query(&base, &opts(Some(4)).with_column(Some("t"), "center_id").unwrap());

        assert!(scoped.text().ends_with("WHERE t.center_id = $2"));
        assert_eq!(scoped.values().len(), 2);
        assert_eq!(scoped.values()[1], SqlValue::Int(4));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let base = ScopedQuery::select("tasks")
            .unwrap()
            .and_where_eq("status", "Open")
            .unwrap();
        let before = base.clone();

        let scoped = scope_query(&base, &opts(Some(1)));

        assert_eq!(base, before);
        assert_eq!(base.values().len(), 1);
        assert_eq!(scoped.values().len(), 2);
    }

    #[test]
    fn test_super_admin_passes_through() {
        let base = ScopedQuery::select("tasks").unwrap();

        let scoped = scope_query(&base, &opts(Some(3)).super_admin(true));

        assert_eq!(scoped, base);
    }

    #[test]
    fn test_not_enforced_is_identity() {
        let base = ScopedQuery::select("tasks")
            .unwrap()
            .and_where_eq("id", 1)
            .unwrap();
        let options = opts(Some(3)).enforce(false);

        let once = scope_query(&base, &options);
        let twice = scope_query(&once, &options);

        assert_eq!(once, base);
        assert_eq!(twice, base);
    }

    #[test]
    fn test_missing_center_returns_query_unscoped() {
        // Current behavior: an enforced scope with no center is fail-open.
        let base = ScopedQuery::select("tasks").unwrap();

        let scoped = scope_query(&base, &opts(None));

        assert_eq!(scoped, base);
        assert_eq!(scoped.text(), "SELECT * FROM tasks");
    }

    #[test]
    fn test_custom_column() {
        let options = opts(Some(9)).with_column(None, "id").unwrap();

        let scoped = scope_query(ScopedQuery::raw("SELECT * FROM center_detail").unwrap(), &options);

        assert_eq!(scoped.text(), "SELECT * FROM center_detail WHERE id = $1");
    }

    #[test]
    fn test_invalid_column_rejected() {
        assert!(opts(Some(1)).with_column(None, "center_id OR 1=1").is_err());
    }

    #[test]
    fn test_string_containing_where_is_not_confused() {
        let base = ScopedQuery::with_values(
            "SELECT 'WHERE' AS label, * FROM programs",
            vec![],
        )
        .unwrap();

        let scoped = scope_query(base, &opts(Some(2)));

        assert_eq!(
            scoped.text(),
            "SELECT 'WHERE' AS label, * FROM programs WHERE center_id = $1"
        );
    }

    #[test]
    fn test_filtered_text_head_is_refused_before_scoping() {
        let err = ScopedQuery::try_from((
            "SELECT * FROM tasks WHERE file_id = $1",
            vec![SqlValue::Int(3)],
        ))
        .unwrap_err();
        assert_eq!(err, QueryError::ClauseInHead("WHERE"));

        // The same filter expressed through the builder scopes cleanly.
        let base = ScopedQuery::select("tasks")
            .unwrap()
            .and_where_eq("file_id", 3)
            .unwrap();
        let scoped = scope_query(&base, &opts(Some(7)));

        assert_eq!(
            scoped.text(),
            "SELECT * FROM tasks WHERE file_id = $1 AND center_id = $2"
        );
        assert_eq!(scoped.text().matches("WHERE").count(), 1);
        assert_eq!(scoped.values(), &[SqlValue::Int(3), SqlValue::Int(7)]);
    }
}
