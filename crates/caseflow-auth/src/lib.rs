//! # Caseflow Auth
//!
//! Authentication types and JWT utilities for the Caseflow API.
//!
//! - [`claims`]: The access token claim structure
//! - [`jwt`]: Token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use caseflow_auth::{create_access_token, verify_token};
//! use caseflow_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "nomsa", 3, Some(center_id), &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, encode_claims, verify_token};
