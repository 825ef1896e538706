use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    bulk_create_absences, delete_absence, get_absence, get_groupe_students, get_student_counts,
    list_absences, update_absence,
};

pub fn init_absences_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_absences))
        .route("/bulk", post(bulk_create_absences))
        .route("/groupe/{groupe_id}/students", get(get_groupe_students))
        .route("/student/{student_id}/counts", get(get_student_counts))
        .route(
            "/{id}",
            get(get_absence).put(update_absence).delete(delete_absence),
        )
}
