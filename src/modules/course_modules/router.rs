use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_module, delete_module, get_module, get_module_schedule, list_modules, update_module,
};

pub fn init_modules_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_module).get(list_modules))
        .route(
            "/{id}",
            get(get_module).put(update_module).delete(delete_module),
        )
        .route("/{id}/schedule", get(get_module_schedule))
}
