use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_session, delete_session, get_attendance_sheet, get_session, list_sessions,
    update_session,
};

pub fn init_sessions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session).get(list_sessions))
        .route(
            "/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/{id}/attendance-sheet", get(get_attendance_sheet))
}
