use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_grade, delete_grade, get_grade, get_module_grades, get_student_average,
    get_student_grades, list_grades, update_grade,
};

pub fn init_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_grade).get(list_grades))
        .route("/{id}", get(get_grade).put(update_grade).delete(delete_grade))
        .route("/student/{student_id}", get(get_student_grades))
        .route("/student/{student_id}/average", get(get_student_average))
        .route("/module/{module_id}", get(get_module_grades))
}
