use http::Method;
use thiserror::Error;

use crate::modules::Module;
use crate::roles::RoleId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RbacError {
    #[error("Unknown role id: {0}")]
    UnknownRole(i32),
    #[error("Unknown module: {0}")]
    UnknownModule(String),
}

/// Reason an authorization check refused a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Denial {
    #[error("Access denied. Unknown role id {0}")]
    UnknownRole(i32),

    #[error("Access denied. {role} is not permitted on this route (allowed roles: {allowed:?})")]
    RoleNotAllowed { role: RoleId, allowed: Vec<RoleId> },

    #[error("Access denied. {role} may not perform {method} requests")]
    MethodNotAllowed { role: RoleId, method: Method },

    #[error("Access denied. {role} cannot access {path}")]
    ModuleNotAllowed { role: RoleId, path: String },

    #[error("Access denied. {role} cannot manage {module}")]
    ManagementRestricted { role: RoleId, module: Module },
}

impl Denial {
    /// Stable label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Denial::UnknownRole(_) => "unknown_role",
            Denial::RoleNotAllowed { .. } => "role_not_allowed",
            Denial::MethodNotAllowed { .. } => "method_not_allowed",
            Denial::ModuleNotAllowed { .. } => "module_not_allowed",
            Denial::ManagementRestricted { .. } => "management_restricted",
        }
    }
}
