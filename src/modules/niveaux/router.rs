use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_niveau, delete_niveau, get_niveau, get_niveau_modules, list_niveaux, update_niveau,
};

pub fn init_niveaux_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_niveau).get(list_niveaux))
        .route(
            "/{id}",
            get(get_niveau).put(update_niveau).delete(delete_niveau),
        )
        .route("/{id}/modules", get(get_niveau_modules))
}
