//! Pagination, sorting and search parameters for list endpoints.
//!
//! List endpoints accept the following query parameters:
//!
//! - `page`: Page number (1-indexed, default: 1)
//! - `limit`: Items per page (1-200, default: 50)
//! - `sort`: Column to sort by (default: `created_at`, whitelisted per resource)
//! - `order`: Sort direction, `asc` or `desc` (default: `desc`)
//! - `search`: Optional free-text search term
//!
//! # Example
//!
//! ```ignore
//! use caseflow_core::pagination::{PaginationParams, PaginationMeta};
//!
//! async fn list(Query(params): Query<PaginationParams>) -> Result<Json<Page>, AppError> {
//!     let rows = fetch(params.limit(), params.offset()).await?;
//!     let total = count().await?;
//!     Ok(Json(Page { data: rows, meta: PaginationMeta::new(&params, total) }))
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;
pub const DEFAULT_SORT: &str = "created_at";

/// Deserializes an optional string into an optional i64.
///
/// Query strings arrive as text and may be empty (`?page=`), which is
/// treated as `None`. Unparseable values are also treated as `None`.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.and_then(|s| s.trim().parse::<i64>().ok()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Items per page (the limit that was applied)
    pub limit: i64,
    /// Current page number
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        let page = params.page();
        let total_pages = if total == 0 {
            0
        } else {
            total.saturating_add(limit - 1) / limit
        };

        Self {
            total,
            limit,
            page,
            total_pages,
            has_more: params.offset().saturating_add(limit) < total,
        }
    }
}

/// Query parameters for list endpoints.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-200, default: 50)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Column to sort by (default: created_at)
    #[serde(default)]
    pub sort: Option<String>,
    /// Sort direction: asc or desc (default: desc)
    #[serde(default)]
    pub order: Option<String>,
    /// Free-text search term
    #[serde(default)]
    pub search: Option<String>,
}

impl PaginationParams {
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Rows to skip. Saturates for absurd page numbers, which then simply
    /// land past the last row.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Requested sort column, not yet checked against any whitelist.
    #[must_use]
    pub fn sort(&self) -> &str {
        self.sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SORT)
    }

    /// Anything other than `asc` (case-insensitive) sorts descending.
    #[must_use]
    pub fn order(&self) -> SortOrder {
        match self.order.as_deref() {
            Some(o) if o.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 50);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.sort(), "created_at");
        assert_eq!(params.order(), SortOrder::Desc);
        assert_eq!(params.search(), None);
    }

    #[test]
    fn test_limit_clamping() {
        let params = PaginationParams {
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(params.limit(), 200);

        let params = PaginationParams {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_offset_from_page() {
        let params = PaginationParams {
            page: Some(3),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(params.offset(), 40);

        let params = PaginationParams {
            page: Some(-4),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_order_parsing() {
        let params = PaginationParams {
            order: Some("ASC".to_string()),
            ..Default::default()
        };
        assert_eq!(params.order(), SortOrder::Asc);

        let params = PaginationParams {
            order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert_eq!(params.order(), SortOrder::Desc);
    }

    #[test]
    fn test_blank_search_is_none() {
        let params = PaginationParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.search(), None);

        let params = PaginationParams {
            search: Some(" smith ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.search(), Some("smith"));
    }

    #[test]
    fn test_deserialize_from_query_strings() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"2","limit":"","sort":"last_name"}"#).unwrap();
        assert_eq!(params.page(), 2);
        assert_eq!(params.limit(), 50);
        assert_eq!(params.sort(), "last_name");
    }

    #[test]
    fn test_meta() {
        let params = PaginationParams {
            page: Some(2),
            limit: Some(10),
            ..Default::default()
        };
        let meta = PaginationMeta::new(&params, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_more);

        let meta = PaginationMeta::new(&params, 20);
        assert_eq!(meta.total_pages, 2);
        assert!(!meta.has_more);

        let meta = PaginationMeta::new(&PaginationParams::default(), 0);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn test_huge_page_saturates() {
        let params = PaginationParams {
            page: Some(i64::MAX),
            limit: Some(200),
            ..Default::default()
        };
        assert_eq!(params.offset(), i64::MAX);

        let meta = PaginationMeta::new(&params, 25);
        assert_eq!(meta.page, i64::MAX);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_more);

        let meta = PaginationMeta::new(&params, i64::MAX);
        assert!(!meta.has_more);
    }
}
