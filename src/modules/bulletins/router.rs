use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_bulletin;

pub fn init_bulletins_router() -> Router<AppState> {
    Router::new().route("/{student_id}", get(get_bulletin))
}
