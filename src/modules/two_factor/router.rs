use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{disable, generate, status, verify_login, verify_setup};

pub fn init_two_factor_router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/verify-setup", post(verify_setup))
        .route("/disable", post(disable))
        .route("/status", get(status))
        .route("/verify-login", post(verify_login))
}
