//! Request pipeline for protected routes.
//!
//! Every module router is wrapped in the same chain:
//!
//! 1. [`auth::AuthUser`] verifies the `Authorization: Bearer <token>` header
//!    (401 on failure)
//! 2. [`role::require_roles`] runs the role table's decision for the route,
//!    method and path (403 on denial)
//! 3. [`tenant::inject_tenant_context`] derives the caller's
//!    [`tenant::TenantContext`] and stores it in the request extensions
//!
//! Handlers then take `TenantContext` as an extractor and use it to scope
//! every query they run.

pub mod auth;
pub mod role;
pub mod tenant;
