use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_filiere, delete_filiere, get_filiere, get_filiere_modules, list_filieres,
    update_filiere,
};

pub fn init_filieres_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_filiere).get(list_filieres))
        .route(
            "/{id}",
            get(get_filiere).put(update_filiere).delete(delete_filiere),
        )
        .route("/{id}/modules", get(get_filiere_modules))
}
