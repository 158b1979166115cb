//! Structured, parameterized SQL statements.
//!
//! A [`ScopedQuery`] keeps the pieces of a statement apart (head, predicate
//! list, ordering, paging, `RETURNING`) and only renders text on demand.
//! Predicates are appended as list entries, so the first one renders as
//! `WHERE` and every later one as `AND` without ever inspecting SQL text.
//!
//! Values are positional: each pushed value gets the next `$n` index, and
//! [`ScopedQuery::arguments`] binds them in the same order.
//!
//! ```
//! use caseflow_db::query::{ScopedQuery, SqlValue};
//!
//! let query = ScopedQuery::select("tasks")
//!     .unwrap()
//!     .and_where_eq("file_id", SqlValue::Int(12))
//!     .unwrap()
//!     .and_where_eq("center_id", SqlValue::Int(3))
//!     .unwrap();
//!
//! assert_eq!(
//!     query.text(),
//!     "SELECT * FROM tasks WHERE file_id = $1 AND center_id = $2"
//! );
//! assert_eq!(query.values().len(), 2);
//! ```

use caseflow_core::SortOrder;
use sqlx::Arguments;
use sqlx::postgres::PgArguments;

use crate::error::QueryError;

/// A bindable parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// Checks a bare SQL identifier: ASCII letter or underscore first, then
/// letters, digits or underscores.
pub fn validate_identifier(name: &str) -> Result<&str, QueryError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(name)
    } else {
        Err(QueryError::InvalidIdentifier(name.to_string()))
    }
}

/// Clauses that may not appear at the top level of a hand-written head.
/// Predicates render after the head, so any of these would end up before
/// the `WHERE` the builder adds.
const TAIL_CLAUSES: &[(&str, Option<&str>, &str)] = &[
    ("WHERE", None, "WHERE"),
    ("GROUP", Some("BY"), "GROUP BY"),
    ("HAVING", None, "HAVING"),
    ("ORDER", Some("BY"), "ORDER BY"),
    ("LIMIT", None, "LIMIT"),
    ("OFFSET", None, "OFFSET"),
    ("RETURNING", None, "RETURNING"),
    ("UNION", None, "UNION"),
    ("INTERSECT", None, "INTERSECT"),
    ("EXCEPT", None, "EXCEPT"),
];

/// Rejects a raw statement head that a predicate cannot be appended to.
///
/// Only the top level counts: words inside parentheses (subqueries, `IN`
/// lists) and inside quoted strings or identifiers are skipped. Comments
/// and `;` are refused outright since either would swallow or detach the
/// appended predicate.
pub fn check_head(head: &str) -> Result<(), QueryError> {
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut depth = 0usize;
    let mut chars = head.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if depth == 0 {
                word.push(c.to_ascii_uppercase());
            }
            continue;
        }
        if !word.is_empty() {
            words.push(std::mem::take(&mut word));
        }

        match c {
            '\'' | '"' => {
                for inner in chars.by_ref() {
                    if inner == c {
                        break;
                    }
                }
            }
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' => return Err(QueryError::ClauseInHead(";")),
            '-' if chars.peek() == Some(&'-') => return Err(QueryError::ClauseInHead("comment")),
            '/' if chars.peek() == Some(&'*') => return Err(QueryError::ClauseInHead("comment")),
            _ => {}
        }
    }
    if !word.is_empty() {
        words.push(word);
    }

    for (i, word) in words.iter().enumerate() {
        for (first, second, name) in TAIL_CLAUSES {
            if word.as_str() != *first {
                continue;
            }
            match second {
                None => return Err(QueryError::ClauseInHead(*name)),
                Some(second) if words.get(i + 1).map(String::as_str) == Some(*second) => {
                    return Err(QueryError::ClauseInHead(*name));
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}

/// A validated column reference, optionally qualified by a table alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef(String);

impl ColumnRef {
    pub fn new(alias: Option<&str>, column: &str) -> Result<Self, QueryError> {
        let column = validate_identifier(column)?;
        match alias {
            Some(alias) => Ok(Self(format!("{}.{}", validate_identifier(alias)?, column))),
            None => Ok(Self(column.to_string())),
        }
    }

    pub(crate) fn unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A value to write into a column, with an optional SQL type cast applied to
/// its placeholder (`$3::date`).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub column: String,
    pub value: SqlValue,
    pub cast: Option<&'static str>,
}

impl ColumnValue {
    pub fn new(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            cast: None,
        }
    }

    pub fn cast(mut self, sql_type: &'static str) -> Self {
        self.cast = Some(sql_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopedQuery {
    head: String,
    predicates: Vec<String>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    returning: Option<String>,
    values: Vec<SqlValue>,
}

impl ScopedQuery {
    /// A statement head whose placeholders (if any) are bound by `values`.
    ///
    /// The head must not carry its own `WHERE` (or anything that would
    /// follow one): filters belong in the predicate list. See [`check_head`].
    pub fn with_values(head: impl Into<String>, values: Vec<SqlValue>) -> Result<Self, QueryError> {
        let head = head.into();
        check_head(&head)?;
        Ok(Self::from_head(head, values))
    }

    pub fn raw(head: impl Into<String>) -> Result<Self, QueryError> {
        Self::with_values(head, Vec::new())
    }

    fn from_head(head: String, values: Vec<SqlValue>) -> Self {
        Self {
            head: head.trim().to_string(),
            predicates: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
            returning: None,
            values,
        }
    }

    pub fn select(table: &str) -> Result<Self, QueryError> {
        Ok(Self::from_head(
            format!("SELECT * FROM {}", validate_identifier(table)?),
            Vec::new(),
        ))
    }

    /// Selects whole rows as JSON objects, one `data` column per row.
    pub fn select_json(table: &str, alias: &str) -> Result<Self, QueryError> {
        let table = validate_identifier(table)?;
        let alias = validate_identifier(alias)?;
        Ok(Self::from_head(
            format!("SELECT to_jsonb({alias}.*) AS data FROM {table} {alias}"),
            Vec::new(),
        ))
    }

    pub fn count(table: &str, alias: &str) -> Result<Self, QueryError> {
        let table = validate_identifier(table)?;
        let alias = validate_identifier(alias)?;
        Ok(Self::from_head(
            format!("SELECT COUNT(*) FROM {table} {alias}"),
            Vec::new(),
        ))
    }

    pub fn insert(table: &str, columns: Vec<ColumnValue>) -> Result<Self, QueryError> {
        let table = validate_identifier(table)?;
        if columns.is_empty() {
            return Err(QueryError::EmptyWrite);
        }

        let mut query = Self::from_head(String::new(), Vec::new());
        let mut names = Vec::with_capacity(columns.len());
        let mut placeholders = Vec::with_capacity(columns.len());
        for column in columns {
            names.push(validate_identifier(&column.column)?.to_string());
            placeholders.push(query.push_value(column.value, column.cast));
        }

        query.head = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            names.join(", "),
            placeholders.join(", ")
        );
        Ok(query)
    }

    pub fn update(table: &str, assignments: Vec<ColumnValue>) -> Result<Self, QueryError> {
        let table = validate_identifier(table)?;
        if assignments.is_empty() {
            return Err(QueryError::EmptyWrite);
        }

        let mut query = Self::from_head(String::new(), Vec::new());
        let mut sets = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let column = validate_identifier(&assignment.column)?.to_string();
            let placeholder = query.push_value(assignment.value, assignment.cast);
            sets.push(format!("{} = {}", column, placeholder));
        }

        query.head = format!("UPDATE {} SET {}", table, sets.join(", "));
        Ok(query)
    }

    pub fn delete(table: &str) -> Result<Self, QueryError> {
        Ok(Self::from_head(
            format!("DELETE FROM {}", validate_identifier(table)?),
            Vec::new(),
        ))
    }

    /// Index the next pushed value will be bound at.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    fn push_value(&mut self, value: SqlValue, cast: Option<&str>) -> String {
        let index = self.next_placeholder();
        self.values.push(value);
        match cast {
            Some(sql_type) => format!("${}::{}", index, sql_type),
            None => format!("${}", index),
        }
    }

    /// Appends `<column> = $n`.
    pub fn and_where_eq(
        self,
        column: &str,
        value: impl Into<SqlValue>,
    ) -> Result<Self, QueryError> {
        let column = ColumnRef::new(None, column)?;
        Ok(self.and_where_column_eq(&column, value.into()))
    }

    pub fn and_where_column_eq(self, column: &ColumnRef, value: SqlValue) -> Self {
        self.push_eq(column, value, None)
    }

    /// Appends `<column> = $n::<sql_type>`.
    pub fn and_where_column_eq_as(
        self,
        column: &ColumnRef,
        value: SqlValue,
        sql_type: &'static str,
    ) -> Self {
        self.push_eq(column, value, Some(sql_type))
    }

    fn push_eq(mut self, column: &ColumnRef, value: SqlValue, cast: Option<&str>) -> Self {
        let placeholder = self.push_value(value, cast);
        self.predicates
            .push(format!("{} = {}", column.as_str(), placeholder));
        self
    }

    /// Appends `(<column> IS NULL OR <column> = $n)`.
    pub fn and_where_column_eq_or_null(mut self, column: &ColumnRef, value: SqlValue) -> Self {
        let placeholder = self.push_value(value, None);
        self.predicates.push(format!(
            "({col} IS NULL OR {col} = {placeholder})",
            col = column.as_str()
        ));
        self
    }

    /// Appends `(<a>::text ILIKE $n OR <b>::text ILIKE $n ...)` with one
    /// shared parameter. No-op when `columns` is empty.
    pub fn and_where_any_ilike(
        mut self,
        columns: &[ColumnRef],
        pattern: impl Into<String>,
    ) -> Self {
        if columns.is_empty() {
            return self;
        }

        let placeholder = self.push_value(SqlValue::Text(pattern.into()), None);
        let alternatives: Vec<String> = columns
            .iter()
            .map(|c| format!("{}::text ILIKE {}", c.as_str(), placeholder))
            .collect();
        self.predicates
            .push(format!("({})", alternatives.join(" OR ")));
        self
    }

    pub fn order_by(mut self, column: &ColumnRef, order: SortOrder) -> Self {
        self.order_by = Some(format!("{} {}", column.as_str(), order.as_sql()));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset.max(0));
        self
    }

    /// `RETURNING to_jsonb(<table>.*) AS data`, matching [`Self::select_json`].
    pub fn returning_json(mut self, table: &str) -> Result<Self, QueryError> {
        let table = validate_identifier(table)?;
        self.returning = Some(format!("to_jsonb({}.*) AS data", table));
        Ok(self)
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Renders the statement text.
    pub fn text(&self) -> String {
        let mut sql = self.head.clone();

        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(predicate);
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        if let Some(returning) = &self.returning {
            sql.push_str(" RETURNING ");
            sql.push_str(returning);
        }

        sql
    }

    /// Binds every value, in placeholder order.
    pub fn arguments(&self) -> Result<PgArguments, QueryError> {
        let mut args = PgArguments::default();

        for (i, value) in self.values.iter().enumerate() {
            let result = match value {
                SqlValue::Null => args.add(None::<String>),
                SqlValue::Bool(v) => args.add(*v),
                SqlValue::Int(v) => args.add(*v),
                SqlValue::Float(v) => args.add(*v),
                SqlValue::Text(v) => args.add(v.clone()),
            };
            result.map_err(|e| QueryError::Bind {
                index: i + 1,
                message: e.to_string(),
            })?;
        }

        Ok(args)
    }
}

impl TryFrom<&str> for ScopedQuery {
    type Error = QueryError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        ScopedQuery::raw(text)
    }
}

impl TryFrom<String> for ScopedQuery {
    type Error = QueryError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        ScopedQuery::raw(text)
    }
}

impl TryFrom<(String, Vec<SqlValue>)> for ScopedQuery {
    type Error = QueryError;

    fn try_from((text, values): (String, Vec<SqlValue>)) -> Result<Self, Self::Error> {
        ScopedQuery::with_values(text, values)
    }
}

impl TryFrom<(&str, Vec<SqlValue>)> for ScopedQuery {
    type Error = QueryError;

    fn try_from((text, values): (&str, Vec<SqlValue>)) -> Result<Self, Self::Error> {
        ScopedQuery::with_values(text, values)
    }
}

impl From<&ScopedQuery> for ScopedQuery {
    fn from(query: &ScopedQuery) -> Self {
        query.clone()
    }
}
