//! The role table.
//!
//! Five fixed roles, identified by the `user_type` carried in access tokens:
//!
//! | id | role | scope | methods | modules |
//! |----|------|-------|---------|---------|
//! | 1 | App Admin | global | all | all |
//! | 2 | HQ | multi-center | all | all, `Center_Detail` read-only |
//! | 3 | Org Admin | own center | all | all |
//! | 4 | Org Executive | own center | GET | all |
//! | 5 | Org Caseworker | own center | all | applicant work only |
//!
//! The table is built once at startup and shared behind an `Arc`; there is
//! no way to register roles at runtime.

use std::collections::BTreeMap;
use std::fmt;

use http::Method;
use serde::Serialize;

use crate::error::{Denial, RbacError};
use crate::modules::Module;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RoleId {
    AppAdmin = 1,
    Hq = 2,
    OrgAdmin = 3,
    OrgExecutive = 4,
    OrgCaseworker = 5,
}

impl RoleId {
    pub const ALL: [RoleId; 5] = [
        RoleId::AppAdmin,
        RoleId::Hq,
        RoleId::OrgAdmin,
        RoleId::OrgExecutive,
        RoleId::OrgCaseworker,
    ];

    pub fn id(&self) -> i32 {
        *self as i32
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoleId::AppAdmin => "App Admin",
            RoleId::Hq => "HQ",
            RoleId::OrgAdmin => "Org Admin",
            RoleId::OrgExecutive => "Org Executive",
            RoleId::OrgCaseworker => "Org Caseworker",
        }
    }
}

impl TryFrom<i32> for RoleId {
    type Error = RbacError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        RoleId::ALL
            .into_iter()
            .find(|r| r.id() == value)
            .ok_or(RbacError::UnknownRole(value))
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How far a role's data access reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    Global,
    MultiCenter,
    CenterOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "modules")]
pub enum ModuleAccess {
    All,
    Only(Vec<Module>),
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub name: &'static str,
    pub label: &'static str,
    pub access: Access,
    pub center_restricted: bool,
    #[serde(serialize_with = "serialize_methods")]
    pub allowed_methods: Vec<Method>,
    pub allowed_modules: ModuleAccess,
    /// Modules the role may read but not manage.
    pub restricted_modules: Vec<Module>,
    pub description: &'static str,
}

fn serialize_methods<S>(methods: &[Method], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(methods.iter().map(Method::as_str))
}

impl RoleDefinition {
    /// HEAD is answered by GET handlers and is allowed wherever GET is.
    pub fn allows_method(&self, method: &Method) -> bool {
        let method = if method == Method::HEAD {
            &Method::GET
        } else {
            method
        };
        self.allowed_methods.contains(method)
    }

    pub fn allows_module(&self, module: Module) -> bool {
        if self.restricted_modules.contains(&module) {
            return false;
        }
        match &self.allowed_modules {
            ModuleAccess::All => true,
            ModuleAccess::Only(modules) => modules.contains(&module),
        }
    }
}

const ALL_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
];

#[derive(Debug, Clone)]
pub struct RoleTable {
    roles: BTreeMap<RoleId, RoleDefinition>,
}

impl RoleTable {
    /// The production role matrix.
    pub fn standard() -> Self {
        let definitions = [
            RoleDefinition {
                id: RoleId::AppAdmin,
                name: "App Admin",
                label: "App Admin",
                access: Access::Global,
                center_restricted: false,
                allowed_methods: ALL_METHODS.to_vec(),
                allowed_modules: ModuleAccess::All,
                restricted_modules: vec![],
                description: "Super Admin - full access to all centers and all operations",
            },
            RoleDefinition {
                id: RoleId::Hq,
                name: "HQ",
                label: "HQ",
                access: Access::MultiCenter,
                center_restricted: false,
                allowed_methods: ALL_METHODS.to_vec(),
                allowed_modules: ModuleAccess::All,
                restricted_modules: vec![Module::CenterDetail],
                description: "HQ - Access to all data except organization management",
            },
            RoleDefinition {
                id: RoleId::OrgAdmin,
                name: "Org Admin",
                label: "Org Admin",
                access: Access::CenterOnly,
                center_restricted: true,
                allowed_methods: ALL_METHODS.to_vec(),
                allowed_modules: ModuleAccess::All,
                restricted_modules: vec![],
                description: "Organization Admin - Full CRUD within own center",
            },
            RoleDefinition {
                id: RoleId::OrgExecutive,
                name: "Org Executive",
                label: "Org Executives",
                access: Access::CenterOnly,
                center_restricted: true,
                allowed_methods: vec![Method::GET],
                allowed_modules: ModuleAccess::All,
                restricted_modules: vec![],
                description: "Organization Executive - View-only access within own center",
            },
            RoleDefinition {
                id: RoleId::OrgCaseworker,
                name: "Org Caseworker",
                label: "Org Caseworkers",
                access: Access::CenterOnly,
                center_restricted: true,
                allowed_methods: ALL_METHODS.to_vec(),
                allowed_modules: ModuleAccess::Only(vec![
                    Module::ApplicantDetails,
                    Module::Tasks,
                    Module::Comments,
                    Module::Relationships,
                    Module::HomeVisit,
                    Module::FinancialAssistance,
                    Module::FoodAssistance,
                    Module::Attachments,
                    Module::Programs,
                    Module::FinancialAssessment,
                    Module::ApplicantIncome,
                    Module::ApplicantExpense,
                ]),
                restricted_modules: vec![],
                description: "Caseworker - CRUD for Applicants and Tasks only within own center",
            },
        ];

        Self {
            roles: definitions.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    pub fn get(&self, role_id: i32) -> Option<&RoleDefinition> {
        RoleId::try_from(role_id)
            .ok()
            .and_then(|id| self.roles.get(&id))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.values()
    }

    /// Unknown roles may do nothing; App Admin may do everything.
    pub fn can_perform_method(&self, role_id: i32, method: &Method) -> bool {
        match self.get(role_id) {
            None => false,
            Some(role) if role.id == RoleId::AppAdmin => true,
            Some(role) => role.allows_method(method),
        }
    }

    pub fn can_access_module(&self, role_id: i32, module: Module) -> bool {
        match self.get(role_id) {
            None => false,
            Some(role) if role.id == RoleId::AppAdmin => true,
            Some(role) => role.allows_module(module),
        }
    }

    /// Module check on a request path. Paths that map to no module are only
    /// reachable by roles with unrestricted module access.
    pub fn can_access_route(&self, role_id: i32, path: &str) -> bool {
        let Some(role) = self.get(role_id) else {
            return false;
        };
        if role.id == RoleId::AppAdmin {
            return true;
        }
        match Module::from_route(path) {
            Some(module) => role.allows_module(module),
            None => role.allowed_modules == ModuleAccess::All,
        }
    }

    /// Unknown roles are treated as restricted.
    pub fn needs_center_restriction(&self, role_id: i32) -> bool {
        self.get(role_id).is_none_or(|role| role.center_restricted)
    }

    pub fn is_multi_center(&self, role_id: i32) -> bool {
        self.get(role_id)
            .is_some_and(|role| matches!(role.access, Access::Global | Access::MultiCenter))
    }

    /// Full authorization decision for one request.
    ///
    /// `allowed_roles` is the set of roles the route was mounted for. App
    /// Admin bypasses every check. A module the role may read but not manage
    /// (HQ on `Center_Detail`) lets GET/HEAD through.
    pub fn authorize(
        &self,
        role_id: i32,
        allowed_roles: &[RoleId],
        method: &Method,
        path: &str,
    ) -> Result<RoleId, Denial> {
        let role = self.get(role_id).ok_or(Denial::UnknownRole(role_id))?;

        if role.id == RoleId::AppAdmin {
            return Ok(role.id);
        }

        if !allowed_roles.contains(&role.id) {
            return Err(Denial::RoleNotAllowed {
                role: role.id,
                allowed: allowed_roles.to_vec(),
            });
        }

        if !role.allows_method(method) {
            return Err(Denial::MethodNotAllowed {
                role: role.id,
                method: method.clone(),
            });
        }

        if self.can_access_route(role_id, path) {
            return Ok(role.id);
        }

        match Module::from_route(path) {
            Some(module) if role.restricted_modules.contains(&module) => {
                if is_safe(method) {
                    Ok(role.id)
                } else {
                    Err(Denial::ManagementRestricted {
                        role: role.id,
                        module,
                    })
                }
            }
            _ => Err(Denial::ModuleNotAllowed {
                role: role.id,
                path: path.to_string(),
            }),
        }
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn is_safe(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}
