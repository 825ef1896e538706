use std::env;

/// Lifetime of the temporary token issued when a login still needs a 2FA code.
pub const TWO_FACTOR_TOKEN_EXPIRY: i64 = 5 * 60;
/// Lifetime of email verification links.
pub const EMAIL_VERIFICATION_EXPIRY: i64 = 10 * 60;
/// Lifetime of password reset links.
pub const PASSWORD_RESET_EXPIRY: i64 = 15 * 60;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "scolaris-dev-secret-change-in-production".to_string()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(12 * 60 * 60),
            refresh_token_expiry: env::var("JWT_REFRESH_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7 * 24 * 60 * 60),
        }
    }
}
