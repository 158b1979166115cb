use axum::{
    Extension, Router,
    extract::{Request, State},
    middleware::{self, Next},
    routing::get,
};

use crate::middleware::role::require_roles;
use crate::middleware::tenant::inject_tenant_context;
use crate::state::AppState;

use super::controller::{create_record, delete_record, get_record, list_records, update_record};
use super::model::ResourceDef;
use super::registry::RESOURCES;

/// CRUD routes for one table. PUT and PATCH both apply a partial update.
pub fn init_resource_router(def: &'static ResourceDef) -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route(
            "/{id}",
            get(get_record)
                .put(update_record)
                .patch(update_record)
                .delete(delete_record),
        )
        .layer(Extension(def))
}

/// Every registered module nested at its route segment, behind role checks
/// and tenant context injection.
pub fn init_resources_router(state: &AppState) -> Router<AppState> {
    RESOURCES.iter().fold(Router::new(), |router, def| {
        let allowed_roles = def.allowed_roles;

        router.nest(
            &format!("/{}", def.module.segment()),
            init_resource_router(def)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    inject_tenant_context,
                ))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    move |state: State<AppState>, req: Request, next: Next| {
                        require_roles(state, req, next, allowed_roles)
                    },
                )),
        )
    })
}
