//! Administrative commands behind the `caseflow-cli` binary.

use anyhow::{Context, anyhow, bail};
use axum::http::Method;
use sqlx::PgPool;

use caseflow_core::hash_password;
use caseflow_rbac::{Denial, Module, ModuleAccess, RoleId, RoleTable};

use crate::modules::resources::registry::find;

const ALL_ROLES: &[RoleId] = &RoleId::ALL;

/// Creates an App Admin account and returns its id.
///
/// Fails if the username is taken or the center does not exist.
pub async fn create_app_admin(
    db: &PgPool,
    username: &str,
    password: &str,
    center_id: Option<i32>,
) -> anyhow::Result<i32> {
    let username = username.trim();
    if username.is_empty() {
        bail!("Username cannot be empty");
    }
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let password_hash = hash_password(password).map_err(|e| anyhow!("{}", e.error))?;

    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO users (username, password_hash, user_type, center_id) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (username) DO NOTHING \
         RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .bind(RoleId::AppAdmin.id())
    .bind(center_id)
    .fetch_optional(db)
    .await
    .context("Failed to insert user")?;

    id.ok_or_else(|| anyhow!("User '{}' already exists", username))
}

/// Accepts a numeric id (`3`) or a role name in any case (`org-admin`,
/// `Org Admin`).
pub fn parse_role(input: &str) -> anyhow::Result<RoleId> {
    let input = input.trim();
    if let Ok(id) = input.parse::<i32>() {
        return Ok(RoleId::try_from(id)?);
    }

    let wanted = normalize(input);
    RoleId::ALL
        .into_iter()
        .find(|role| normalize(role.name()) == wanted)
        .ok_or_else(|| anyhow!("Unknown role: {}", input))
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn parse_method(input: &str) -> anyhow::Result<Method> {
    Method::from_bytes(input.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("Invalid HTTP method: {}", input))
}

/// Runs the same decision `require_roles` makes for a request.
pub fn check_access(
    table: &RoleTable,
    role: RoleId,
    method: &Method,
    path: &str,
) -> Result<RoleId, Denial> {
    let allowed_roles = Module::from_route(path)
        .and_then(find)
        .map_or(ALL_ROLES, |def| def.allowed_roles);

    table.authorize(role.id(), allowed_roles, method, path)
}

/// One line per role: id, name, scope, methods and modules.
pub fn render_role_matrix(table: &RoleTable) -> String {
    let mut out = format!(
        "{:<3} {:<15} {:<13} {:<28} {}\n",
        "ID", "ROLE", "SCOPE", "METHODS", "MODULES"
    );

    for def in table.definitions() {
        let methods: Vec<&str> = def.allowed_methods.iter().map(Method::as_str).collect();
        let mut modules = match &def.allowed_modules {
            ModuleAccess::All => "all".to_string(),
            ModuleAccess::Only(list) => list
                .iter()
                .map(|m| m.segment())
                .collect::<Vec<_>>()
                .join(","),
        };
        if !def.restricted_modules.is_empty() {
            let restricted: Vec<&str> = def.restricted_modules.iter().map(|m| m.segment()).collect();
            modules.push_str(&format!(" (read-only: {})", restricted.join(",")));
        }
        let scope = if def.center_restricted {
            "own center"
        } else {
            "all centers"
        };

        out.push_str(&format!(
            "{:<3} {:<15} {:<13} {:<28} {}\n",
            def.id.id(),
            def.name,
            scope,
            methods.join(","),
            modules
        ));
    }

    out
}

pub fn role_matrix_json(table: &RoleTable) -> anyhow::Result<String> {
    let definitions: Vec<_> = table.definitions().collect();
    Ok(serde_json::to_string_pretty(&definitions)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_by_id_and_name() {
        assert_eq!(parse_role("3").unwrap(), RoleId::OrgAdmin);
        assert_eq!(parse_role("org-executive").unwrap(), RoleId::OrgExecutive);
        assert_eq!(parse_role("HQ").unwrap(), RoleId::Hq);
        assert!(parse_role("9").is_err());
        assert!(parse_role("teacher").is_err());
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("delete").unwrap(), Method::DELETE);
        assert!(parse_method("NOT A METHOD").is_err());
    }

    #[test]
    fn test_check_access_matches_route_rules() {
        let table = RoleTable::standard();

        assert!(check_access(&table, RoleId::OrgCaseworker, &Method::DELETE, "/api/tasks").is_ok());
        assert!(matches!(
            check_access(&table, RoleId::OrgExecutive, &Method::DELETE, "/api/tasks/4"),
            Err(Denial::MethodNotAllowed { .. })
        ));
        assert!(check_access(&table, RoleId::Hq, &Method::GET, "/api/centerDetail").is_ok());
        assert!(matches!(
            check_access(&table, RoleId::Hq, &Method::PUT, "/api/centerDetail/1"),
            Err(Denial::ManagementRestricted { .. })
        ));
        assert!(matches!(
            check_access(&table, RoleId::OrgCaseworker, &Method::GET, "/api/employee"),
            Err(Denial::RoleNotAllowed { .. })
        ));
    }

    #[test]
    fn test_role_matrix_lists_every_role() {
        let table = RoleTable::standard();
        let matrix = render_role_matrix(&table);

        for role in RoleId::ALL {
            assert!(matrix.contains(role.name()), "{} missing", role.name());
        }
        assert!(matrix.contains("read-only: centerDetail"));

        let json: serde_json::Value = serde_json::from_str(&role_matrix_json(&table).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 5);
    }
}
