use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use scolaris_core::AppError;
use scolaris_models::MessageResponse;
use scolaris_models::auth::LoginResponse;
use scolaris_models::two_factor::{
    DisableTwoFactorRequest, GenerateTwoFactorResponse, TwoFactorStatusResponse,
    VerifyTwoFactorLoginRequest, VerifyTwoFactorSetupRequest,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::session::open_session;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::TwoFactorService;

/// Start 2FA enrollment
#[utoipa::path(
    post,
    path = "/api/auth/2fa/generate",
    responses(
        (status = 200, description = "Secret, QR code and backup codes", body = GenerateTwoFactorResponse),
        (status = 400, description = "2FA is already enabled", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Two-Factor Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn generate(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<GenerateTwoFactorResponse>, AppError> {
    let response =
        TwoFactorService::generate(&state.db, auth_user.user_id, auth_user.email()).await?;
    Ok(Json(response))
}

/// Confirm enrollment with a first code
#[utoipa::path(
    post,
    path = "/api/auth/2fa/verify-setup",
    request_body = VerifyTwoFactorSetupRequest,
    responses(
        (status = 200, description = "2FA enabled", body = MessageResponse),
        (status = 400, description = "2FA not set up or invalid code", body = ErrorResponse)
    ),
    tag = "Two-Factor Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn verify_setup(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<VerifyTwoFactorSetupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    TwoFactorService::verify_setup(&state.db, auth_user.user_id, &dto.token).await?;
    Ok(Json(MessageResponse::new("2FA has been enabled")))
}

/// Turn 2FA off after re-entering the password
#[utoipa::path(
    post,
    path = "/api/auth/2fa/disable",
    request_body = DisableTwoFactorRequest,
    responses(
        (status = 200, description = "2FA disabled", body = MessageResponse),
        (status = 400, description = "2FA not enabled or invalid password", body = ErrorResponse)
    ),
    tag = "Two-Factor Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn disable(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<DisableTwoFactorRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    TwoFactorService::disable(&state.db, auth_user.user_id, &dto.password).await?;
    Ok(Json(MessageResponse::new("2FA has been disabled")))
}

#[utoipa::path(
    get,
    path = "/api/auth/2fa/status",
    responses(
        (status = 200, description = "2FA status", body = TwoFactorStatusResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Two-Factor Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<TwoFactorStatusResponse>, AppError> {
    let status = TwoFactorService::status(&state.db, auth_user.user_id).await?;
    Ok(Json(status))
}

/// Finish a login that returned `requires_2fa`
#[utoipa::path(
    post,
    path = "/api/auth/2fa/verify-login",
    request_body = VerifyTwoFactorLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid 2FA token", body = ErrorResponse),
        (status = 401, description = "Invalid or expired temporary token", body = ErrorResponse)
    ),
    tag = "Two-Factor Authentication"
)]
#[instrument(skip(state, session, dto))]
pub async fn verify_login(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(dto): ValidatedJson<VerifyTwoFactorLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::verify_two_factor_login(&state.db, dto, &state.jwt_config).await?;
    open_session(&session, response.user.id, true).await?;
    Ok(Json(response))
}
