//! # Caseflow Core
//!
//! Core types, errors, and utilities for the Caseflow API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination, sorting and search parameters
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Lenient deserialization helpers for token claims
//!
//! # Example
//!
//! ```ignore
//! use caseflow_core::errors::AppError;
//! use caseflow_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Applicant not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams, SortOrder};
pub use password::{hash_password, verify_password};
