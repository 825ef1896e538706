use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{
    add_permission, create_permission_set, delete_permission_set, get_permission_set,
    get_role_permission_sets, list_permission_sets, remove_permission, update_permission_set,
};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_permission_sets).post(create_permission_set))
        .route("/role/{role_id}", get(get_role_permission_sets))
        .route(
            "/{id}",
            get(get_permission_set)
                .put(update_permission_set)
                .delete(delete_permission_set),
        )
        .route("/{id}/add-permission", patch(add_permission))
        .route("/{id}/remove-permission", patch(remove_permission))
}
