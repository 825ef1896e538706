use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{delete_user, get_user, list_users, update_user};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}
