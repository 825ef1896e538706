use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_attendance_list, delete_attendance_list, get_attendance_list, list_attendance_lists,
    update_attendance_list,
};

pub fn init_attendance_lists_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_attendance_list).get(list_attendance_lists))
        .route(
            "/{id}",
            get(get_attendance_list)
                .put(update_attendance_list)
                .delete(delete_attendance_list),
        )
}
