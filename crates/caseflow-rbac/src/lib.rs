//! # Caseflow RBAC
//!
//! Role-based access control for the Caseflow API.
//!
//! - [`roles`]: The fixed role table and the authorization checks over it
//! - [`modules`]: Functional modules and their API route prefixes
//! - [`error`]: Lookup errors and authorization denials
//!
//! The table is a plain value: build it once with [`RoleTable::standard`],
//! wrap it in an `Arc` and hand it to whatever needs to make decisions.
//!
//! # Example
//!
//! ```
//! use caseflow_rbac::{Module, RoleTable};
//! use http::Method;
//!
//! let table = RoleTable::standard();
//!
//! assert!(table.can_perform_method(5, &Method::DELETE));
//! assert!(!table.can_perform_method(4, &Method::DELETE));
//! assert!(!table.can_access_route(2, "/api/centerDetail"));
//! assert!(table.can_access_module(3, Module::CenterDetail));
//! ```

pub mod error;
pub mod modules;
pub mod roles;

pub use error::{Denial, RbacError};
pub use modules::Module;
pub use roles::{Access, ModuleAccess, RoleDefinition, RoleId, RoleTable};
