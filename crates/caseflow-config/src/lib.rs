//! # Caseflow Config
//!
//! Configuration types for the Caseflow API, loaded from environment variables:
//!
//! - [`jwt`]: JWT authentication configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`server`]: Bind address, request timeout and slow-request threshold
//! - [`tenant`]: Tenant column and missing-center policy
//!
//! # Example
//!
//! ```ignore
//! use caseflow_config::{JwtConfig, ServerConfig, TenantConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! let tenant_config = TenantConfig::from_env()?;
//! ```

pub mod cors;
pub mod jwt;
pub mod server;
pub mod tenant;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use tenant::{MissingCenterPolicy, TenantConfig, TenantConfigError};
