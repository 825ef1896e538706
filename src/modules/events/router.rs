use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_event, delete_event, get_event, list_events, update_event};

pub fn init_events_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event).get(list_events))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
}
