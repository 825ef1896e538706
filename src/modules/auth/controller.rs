use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;
use utoipa::ToSchema;

use scolaris_core::AppError;
use scolaris_models::MessageResponse;
use scolaris_models::User;
use scolaris_models::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RefreshTokenRequest,
    RegisterRequest, ResetPasswordRequest, TokenPairResponse, TwoFactorRequiredResponse,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::session::{close_session, open_session};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::{AuthService, LoginOutcome};

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Register a new student account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, verification email sent", body = User),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = AuthService::register(&state.db, &state.email(), dto, &state.jwt_config).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login and receive tokens, or a 2FA challenge
///
/// Also opens a cookie session. For accounts with 2FA the session stays
/// unusable until `/api/auth/2fa/verify-login` succeeds.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 200, description = "2FA required", body = TwoFactorRequiredResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account is deactivated", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, session, dto))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Response, AppError> {
    match AuthService::login(&state.db, dto, &state.jwt_config).await? {
        LoginOutcome::Authenticated(login_response) => {
            open_session(&session, login_response.user.id, true).await?;
            Ok(Json(login_response).into_response())
        }
        LoginOutcome::TwoFactorRequired(user_id, two_factor_required) => {
            open_session(&session, user_id, false).await?;
            Ok(Json(two_factor_required).into_response())
        }
    }
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access and refresh tokens", body = TokenPairResponse),
        (status = 401, description = "Invalid, expired or already used refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    let tokens = AuthService::refresh(&state.db, &dto.refresh_token, &state.jwt_config).await?;
    Ok(Json(tokens))
}

/// Confirm an email address from the emailed link
#[utoipa::path(
    get,
    path = "/api/auth/verify/{token}",
    params(("token" = String, Path, description = "Email verification token")),
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired verification token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, token))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::verify_email(&state.db, &token, &state.jwt_config).await?;
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// Request a password reset email
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::forgot_password(&state.db, &state.email(), dto, &state.jwt_config).await?;
    Ok(Json(MessageResponse::new(
        "If this email exists, a password reset link has been sent",
    )))
}

/// Choose a new password with the emailed reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    params(("token" = String, Path, description = "Password reset token")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid or expired reset token", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, token, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::reset_password(&state.db, &state.email(), &token, dto, &state.jwt_config)
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset successfully")))
}

/// The current user with role and resolved permissions
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = AuthService::profile(&state.db, auth_user.user_id).await?;
    Ok(Json(profile))
}

/// Revoke the presented access token and end the cookie session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    auth_user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(claims) = &auth_user.claims {
        AuthService::logout(&state.db, auth_user.user_id, claims).await?;
    }
    close_session(&session).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}
