use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use scolaris_auth::{
    Claims, TokenPurpose, create_access_token, create_purpose_token, create_refresh_token,
    create_two_factor_token, verify_purpose_token,
};
use scolaris_config::JwtConfig;
use scolaris_config::jwt::{EMAIL_VERIFICATION_EXPIRY, PASSWORD_RESET_EXPIRY};
use scolaris_core::{AppError, hash_password, verify_password};
use scolaris_models::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    ResetPasswordRequest, TokenPairResponse, TwoFactorRequiredResponse,
};
use scolaris_models::system_roles;
use scolaris_models::two_factor::VerifyTwoFactorLoginRequest;
use scolaris_models::{USER_COLUMNS, User};

use crate::metrics::track_login;
use crate::modules::permissions::service::PermissionSetService;
use crate::modules::two_factor::service::TwoFactorService;
use crate::utils::email::EmailService;

fn expires_at(exp: usize) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(exp as i64, 0).unwrap_or_else(Utc::now)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Result of checking a password.
pub enum LoginOutcome {
    Authenticated(LoginResponse),
    /// The password was right but a second factor is still owed.
    TwoFactorRequired(Uuid, TwoFactorRequiredResponse),
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, email, dto, jwt_config), fields(email = %dto.email))]
    pub async fn register(
        db: &PgPool,
        email: &EmailService,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email, password, birth_date,
                                phone_number, address, zip_code, role_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(normalize_email(&dto.email))
        .bind(&hashed_password)
        .bind(dto.birth_date)
        .bind(&dto.phone_number)
        .bind(&dto.address)
        .bind(&dto.zip_code)
        .bind(system_roles::STUDENT)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow!("This email is already in use"));
            }
            AppError::from(e)
        })?;

        Self::send_verification_link(db, email, &user, jwt_config).await?;

        Ok(user)
    }

    /// Issues an email-verification token for `user` and mails the link.
    /// A mail failure is logged and does not fail the caller.
    #[instrument(skip(db, email, user, jwt_config), fields(user_id = %user.id))]
    pub async fn send_verification_link(
        db: &PgPool,
        email: &EmailService,
        user: &User,
        jwt_config: &JwtConfig,
    ) -> Result<(), AppError> {
        let token = Self::issue_action_token(
            db,
            user.id,
            &user.email,
            TokenPurpose::EmailVerification,
            EMAIL_VERIFICATION_EXPIRY,
            jwt_config,
        )
        .await?;

        if let Err(e) = email
            .send_verification_email(&user.email, &user.first_name, &token)
            .await
        {
            warn!(error = %e.error, "Failed to send verification email");
        }

        Ok(())
    }

    /// Returns the final login response, or the 2FA challenge when the
    /// account has a second factor enabled.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginOutcome, AppError> {
        #[derive(sqlx::FromRow)]
        struct Credentials {
            id: Uuid,
            email: String,
            password: String,
            is_active: bool,
            two_factor_enabled: bool,
        }

        let Some(user) = sqlx::query_as::<_, Credentials>(
            "SELECT id, email, password, is_active, two_factor_enabled FROM users WHERE email = $1",
        )
        .bind(normalize_email(&dto.email))
        .fetch_optional(db)
        .await?
        else {
            track_login("invalid_credentials");
            return Err(AppError::unauthorized("Invalid email or password"));
        };

        if !verify_password(&dto.password, &user.password)? {
            track_login("invalid_credentials");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        if !user.is_active {
            track_login("inactive");
            return Err(AppError::forbidden("Account is deactivated"));
        }

        if user.two_factor_enabled {
            track_login("two_factor_required");
            let temp_token = create_two_factor_token(user.id, &user.email, jwt_config)?;
            return Ok(LoginOutcome::TwoFactorRequired(
                user.id,
                TwoFactorRequiredResponse {
                    requires_2fa: true,
                    temp_token,
                    message: "2FA verification required".to_string(),
                },
            ));
        }

        let response = Self::complete_login(db, user.id, jwt_config).await?;
        track_login("success");
        Ok(LoginOutcome::Authenticated(response))
    }

    /// Second login step: exchanges the temporary token and a TOTP or backup
    /// code for the final tokens.
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn verify_two_factor_login(
        db: &PgPool,
        dto: VerifyTwoFactorLoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let claims = verify_purpose_token(
            &dto.temp_token,
            TokenPurpose::TwoFactorVerification,
            jwt_config,
        )
        .map_err(|_| AppError::unauthorized("Invalid or expired temporary token"))?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid or expired temporary token"))?;

        if !TwoFactorService::verify_code(db, user_id, &dto.token).await? {
            track_login("two_factor_failed");
            return Err(AppError::bad_request(anyhow!("Invalid 2FA token")));
        }

        let response = Self::complete_login(db, user_id, jwt_config).await?;
        track_login("success");
        Ok(response)
    }

    async fn complete_login(
        db: &PgPool,
        user_id: Uuid,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        if !user.is_active {
            return Err(AppError::forbidden("Account is deactivated"));
        }

        let (role, permissions) = PermissionSetService::resolve_for_role(db, user.role_id).await?;
        let tokens = Self::issue_token_pair(&user, role.clone(), permissions.clone(), jwt_config)?;

        Ok(LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
            role,
            permissions,
        })
    }

    fn issue_token_pair(
        user: &User,
        role: Option<String>,
        permissions: Vec<String>,
        jwt_config: &JwtConfig,
    ) -> Result<TokenPairResponse, AppError> {
        let access_token = create_access_token(
            user.id,
            &user.email,
            user.role_id,
            role,
            permissions,
            jwt_config,
        )?;
        let (refresh_token, _) = create_refresh_token(user.id, &user.email, jwt_config)?;

        Ok(TokenPairResponse {
            access_token,
            refresh_token,
        })
    }

    /// Rotates a refresh token. Each refresh token can be used once: its jti
    /// is revoked before the new pair is issued.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<TokenPairResponse, AppError> {
        let invalid = || AppError::unauthorized("Invalid or expired refresh token");

        let claims = verify_purpose_token(refresh_token, TokenPurpose::Refresh, jwt_config)
            .map_err(|_| invalid())?;
        let user_id = claims.user_id().ok_or_else(invalid)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(invalid)?;

        let revoked: Option<(Uuid,)> = sqlx::query_as(
            "INSERT INTO revoked_tokens (jti, user_id, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (jti) DO NOTHING
             RETURNING jti",
        )
        .bind(claims.jti)
        .bind(user_id)
        .bind(expires_at(claims.exp))
        .fetch_optional(db)
        .await?;

        if revoked.is_none() {
            return Err(invalid());
        }

        if !user.is_active {
            return Err(AppError::forbidden("Account is deactivated"));
        }

        let (role, permissions) = PermissionSetService::resolve_for_role(db, user.role_id).await?;
        Self::issue_token_pair(&user, role, permissions, jwt_config)
    }

    #[instrument(skip(db, token, jwt_config))]
    pub async fn verify_email(
        db: &PgPool,
        token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<(), AppError> {
        let user_id = Self::consume_action_token(
            db,
            token,
            TokenPurpose::EmailVerification,
            jwt_config,
            "Invalid or expired verification token",
        )
        .await?;

        sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Always succeeds so the response does not reveal whether the account exists.
    #[instrument(skip(db, email, dto, jwt_config))]
    pub async fn forgot_password(
        db: &PgPool,
        email: &EmailService,
        dto: ForgotPasswordRequest,
        jwt_config: &JwtConfig,
    ) -> Result<(), AppError> {
        #[derive(sqlx::FromRow)]
        struct Recipient {
            id: Uuid,
            email: String,
            first_name: String,
        }

        let Some(user) = sqlx::query_as::<_, Recipient>(
            "SELECT id, email, first_name FROM users WHERE email = $1 AND is_active = TRUE",
        )
        .bind(normalize_email(&dto.email))
        .fetch_optional(db)
        .await?
        else {
            return Ok(());
        };

        let token = Self::issue_action_token(
            db,
            user.id,
            &user.email,
            TokenPurpose::PasswordReset,
            PASSWORD_RESET_EXPIRY,
            jwt_config,
        )
        .await?;

        if let Err(e) = email
            .send_password_reset_email(&user.email, &user.first_name, &token)
            .await
        {
            warn!(error = %e.error, "Failed to send password reset email");
        }

        Ok(())
    }

    #[instrument(skip(db, email, token, dto, jwt_config))]
    pub async fn reset_password(
        db: &PgPool,
        email: &EmailService,
        token: &str,
        dto: ResetPasswordRequest,
        jwt_config: &JwtConfig,
    ) -> Result<(), AppError> {
        let user_id = Self::consume_action_token(
            db,
            token,
            TokenPurpose::PasswordReset,
            jwt_config,
            "Invalid or expired reset token",
        )
        .await?;

        let hashed_password = hash_password(&dto.new_password)?;

        #[derive(sqlx::FromRow)]
        struct Recipient {
            email: String,
            first_name: String,
        }

        let user = sqlx::query_as::<_, Recipient>(
            "UPDATE users SET password = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING email, first_name",
        )
        .bind(&hashed_password)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid or expired reset token")))?;

        if let Err(e) = email
            .send_password_reset_confirmation(&user.email, &user.first_name)
            .await
        {
            warn!(error = %e.error, "Failed to send password reset confirmation");
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn profile(db: &PgPool, user_id: Uuid) -> Result<ProfileResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let (role, permissions) = PermissionSetService::resolve_for_role(db, user.role_id).await?;

        Ok(ProfileResponse {
            user,
            role,
            permissions,
        })
    }

    /// Revokes the presented access token until it expires.
    #[instrument(skip(db, claims), fields(jti = %claims.jti))]
    pub async fn logout(db: &PgPool, user_id: Uuid, claims: &Claims) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, user_id, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(claims.jti)
        .bind(user_id)
        .bind(expires_at(claims.exp))
        .execute(db)
        .await?;

        Ok(())
    }

    /// Signs a single-use token and records it so it can be consumed once.
    pub async fn issue_action_token(
        db: &PgPool,
        user_id: Uuid,
        email: &str,
        purpose: TokenPurpose,
        ttl_seconds: i64,
        jwt_config: &JwtConfig,
    ) -> Result<String, AppError> {
        let (token, claims) = create_purpose_token(user_id, email, purpose, ttl_seconds, jwt_config)?;

        sqlx::query(
            "INSERT INTO action_tokens (jti, user_id, purpose, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(claims.jti)
        .bind(user_id)
        .bind(purpose.as_str())
        .bind(expires_at(claims.exp))
        .execute(db)
        .await?;

        Ok(token)
    }

    /// Verifies the token and marks it consumed. Returns the owner's id.
    pub async fn consume_action_token(
        db: &PgPool,
        token: &str,
        purpose: TokenPurpose,
        jwt_config: &JwtConfig,
        invalid_message: &'static str,
    ) -> Result<Uuid, AppError> {
        let claims = verify_purpose_token(token, purpose, jwt_config)
            .map_err(|_| AppError::bad_request(anyhow!(invalid_message)))?;

        let consumed: Option<(Uuid,)> = sqlx::query_as(
            "UPDATE action_tokens SET consumed_at = NOW()
             WHERE jti = $1 AND purpose = $2 AND consumed_at IS NULL AND expires_at > NOW()
             RETURNING user_id",
        )
        .bind(claims.jti)
        .bind(purpose.as_str())
        .fetch_optional(db)
        .await?;

        consumed
            .map(|(user_id,)| user_id)
            .ok_or_else(|| AppError::bad_request(anyhow!(invalid_message)))
    }
}
