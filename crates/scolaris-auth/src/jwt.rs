//! JWT creation and verification.
//!
//! Token kinds:
//!
//! - **Access**: bearer token for the API, lifetime `JWT_ACCESS_EXPIRY`
//! - **Refresh**: exchanged for a new access token, lifetime `JWT_REFRESH_EXPIRY`
//! - **2FA verification**: issued by login when a TOTP code is still needed (5 minutes)
//! - **Email verification / password reset**: embedded in emailed links
//!
//! All are HS256 tokens signed with `JWT_SECRET`, and each carries a `jti`.
//!
//! # Example
//!
//! ```ignore
//! let token = create_access_token(user_id, "prof@scolaris.ma", Some(role_id), Some("Teacher".into()), perms, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use uuid::Uuid;

use scolaris_config::JwtConfig;
use scolaris_config::jwt::TWO_FACTOR_TOKEN_EXPIRY;
use scolaris_core::AppError;

use crate::claims::{Claims, PurposeClaims, TokenPurpose};

fn now() -> usize {
    Utc::now().timestamp() as usize
}

fn sign<T: Serialize>(claims: &T, jwt_config: &JwtConfig) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role_id: Option<Uuid>,
    role: Option<String>,
    permissions: Vec<String>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let iat = now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role_id,
        role,
        permissions,
        purpose: TokenPurpose::Access,
        jti: Uuid::new_v4(),
        exp: iat + jwt_config.access_token_expiry as usize,
        iat,
    };

    sign(&claims, jwt_config)
}

/// Verifies an access token.
///
/// A valid 2FA temporary token is rejected with a dedicated message so the
/// client knows to finish the second factor.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

    match claims.purpose {
        TokenPurpose::Access => Ok(claims),
        TokenPurpose::TwoFactorVerification => {
            Err(AppError::unauthorized("2FA verification required"))
        }
        _ => Err(AppError::unauthorized("Invalid or expired token")),
    }
}

/// Signs a token of the given purpose and returns it with its claims.
pub fn create_purpose_token(
    user_id: Uuid,
    email: &str,
    purpose: TokenPurpose,
    ttl_seconds: i64,
    jwt_config: &JwtConfig,
) -> Result<(String, PurposeClaims), AppError> {
    let iat = now();
    let claims = PurposeClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        purpose,
        jti: Uuid::new_v4(),
        exp: iat + ttl_seconds.max(0) as usize,
        iat,
    };

    let token = sign(&claims, jwt_config)?;
    Ok((token, claims))
}

/// Verifies signature, expiry and purpose. Failures are 400s because these
/// tokens arrive in request bodies or links rather than the auth header.
pub fn verify_purpose_token(
    token: &str,
    expected: TokenPurpose,
    jwt_config: &JwtConfig,
) -> Result<PurposeClaims, AppError> {
    let claims = decode::<PurposeClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::bad_request(anyhow!("Invalid or expired token")))?;

    if claims.purpose != expected {
        return Err(AppError::bad_request(anyhow!("Invalid or expired token")));
    }

    Ok(claims)
}

pub fn create_two_factor_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    create_purpose_token(
        user_id,
        email,
        TokenPurpose::TwoFactorVerification,
        TWO_FACTOR_TOKEN_EXPIRY,
        jwt_config,
    )
    .map(|(token, _)| token)
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<(String, PurposeClaims), AppError> {
    create_purpose_token(
        user_id,
        email,
        TokenPurpose::Refresh,
        jwt_config.refresh_token_expiry,
        jwt_config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn test_access_token_roundtrip_keeps_role_and_permissions() {
        let user_id = Uuid::new_v4();
        let role_id = Uuid::new_v4();
        let token = create_access_token(
            user_id,
            "prof@scolaris.ma",
            Some(role_id),
            Some("Teacher".to_string()),
            vec!["grade:create".to_string()],
            &config(),
        )
        .unwrap();

        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role_id, Some(role_id));
        assert_eq!(claims.role.as_deref(), Some("Teacher"));
        assert_eq!(claims.permissions, vec!["grade:create"]);
        assert_eq!(claims.purpose, TokenPurpose::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_each_access_token_has_its_own_jti() {
        let id = Uuid::new_v4();
        let a = create_access_token(id, "a@b.c", None, None, vec![], &config()).unwrap();
        let b = create_access_token(id, "a@b.c", None, None, vec![], &config()).unwrap();
        let ca = verify_token(&a, &config()).unwrap();
        let cb = verify_token(&b, &config()).unwrap();
        assert_ne!(ca.jti, cb.jti);
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_garbage() {
        let token =
            create_access_token(Uuid::new_v4(), "a@b.c", None, None, vec![], &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret-key-also-32-characters".to_string(),
            ..config()
        };
        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert!(verify_token("not.a.jwt", &config()).is_err());
    }

    #[test]
    fn test_two_factor_token_is_not_an_access_token() {
        let token = create_two_factor_token(Uuid::new_v4(), "a@b.c", &config()).unwrap();
        let err = verify_token(&token, &config()).unwrap_err();
        assert_eq!(err.error.to_string(), "2FA verification required");

        let claims =
            verify_purpose_token(&token, TokenPurpose::TwoFactorVerification, &config()).unwrap();
        assert_eq!(claims.exp - claims.iat, TWO_FACTOR_TOKEN_EXPIRY as usize);
    }

    #[test]
    fn test_purpose_mismatch_is_rejected() {
        let (token, _) = create_purpose_token(
            Uuid::new_v4(),
            "a@b.c",
            TokenPurpose::EmailVerification,
            600,
            &config(),
        )
        .unwrap();

        assert!(verify_purpose_token(&token, TokenPurpose::EmailVerification, &config()).is_ok());
        let err =
            verify_purpose_token(&token, TokenPurpose::PasswordReset, &config()).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn test_expired_purpose_token_is_rejected() {
        let cfg = config();
        let iat = now() - 3600;
        let claims = PurposeClaims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.c".into(),
            purpose: TokenPurpose::PasswordReset,
            jti: Uuid::new_v4(),
            exp: iat + 60,
            iat,
        };
        let token = sign(&claims, &cfg).unwrap();
        assert!(verify_purpose_token(&token, TokenPurpose::PasswordReset, &cfg).is_err());
    }

    #[test]
    fn test_refresh_token_claims() {
        let user_id = Uuid::new_v4();
        let (token, claims) = create_refresh_token(user_id, "a@b.c", &config()).unwrap();
        assert_eq!(claims.user_id(), Some(user_id));
        let decoded = verify_purpose_token(&token, TokenPurpose::Refresh, &config()).unwrap();
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.exp - decoded.iat, 604800);
    }
}
