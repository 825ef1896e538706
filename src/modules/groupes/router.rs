use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_groupe, delete_groupe, get_groupe, get_groupe_users, list_groupes, update_groupe,
};

pub fn init_groupes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_groupe).get(list_groupes))
        .route(
            "/{id}",
            get(get_groupe).put(update_groupe).delete(delete_groupe),
        )
        .route("/{id}/users", get(get_groupe_users))
}
