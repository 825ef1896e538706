use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    delete_resource, get_resource, list_resources, update_resource, upload_resource,
};

pub fn init_resources_router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_resource).get(list_resources))
        .route(
            "/{id}",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
}
