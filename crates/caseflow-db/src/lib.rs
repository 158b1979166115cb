//! # Caseflow DB
//!
//! Database pool, structured queries and tenant scoping for the Caseflow API.
//!
//! - [`query`]: [`ScopedQuery`], a parameterized statement built from parts
//! - [`scope`]: [`scope_query`], which restricts a statement to one center
//!
//! # Example
//!
//! ```ignore
//! use caseflow_db::init_db_pool;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = init_db_pool(&std::env::var("DATABASE_URL").unwrap()).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod query;
pub mod scope;

use sqlx::postgres::PgPoolOptions;

pub use error::QueryError;
pub use query::{ColumnRef, ColumnValue, ScopedQuery, SqlValue, validate_identifier};
pub use scope::{DEFAULT_TENANT_COLUMN, ScopeOptions, scope_query};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Opens a PostgreSQL connection pool.
///
/// Called once at startup; the pool is cheap to clone and lives in the
/// application state.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool initialized");
    Ok(pool)
}

/// Applies pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
