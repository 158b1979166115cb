use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use caseflow_core::{PaginationMeta, PaginationParams, SortOrder};

use crate::modules::auth::model::{
    ErrorResponse, LoginRequest, LoginResponse, SessionResponse, UserProfile,
};
use crate::modules::resources::ResourceList;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_session,
        crate::modules::resources::controller::list_records,
        crate::modules::resources::controller::get_record,
        crate::modules::resources::controller::create_record,
        crate::modules::resources::controller::update_record,
        crate::modules::resources::controller::delete_record,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            UserProfile,
            SessionResponse,
            ErrorResponse,
            ResourceList,
            PaginationMeta,
            PaginationParams,
            SortOrder,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and session endpoints"),
        (name = "Resources", description = "Center-scoped CRUD over case files, assistance, inventory and staff records")
    ),
    info(
        title = "Caseflow API",
        version = "0.1.0",
        description = "Case management REST API with role-based access control and per-center data isolation.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_resource_routes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/{resource}"));
        assert!(doc.paths.paths.contains_key("/api/{resource}/{id}"));
    }
}
