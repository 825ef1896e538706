use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::two_factor::router::init_two_factor_router;
use crate::state::AppState;

use super::controller::{
    forgot_password, login, logout, profile, refresh, register, reset_password, verify_email,
};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/verify/{token}", get(verify_email))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password))
        .route("/profile", get(profile))
        .route("/logout", post(logout))
        .nest("/2fa", init_two_factor_router())
}
