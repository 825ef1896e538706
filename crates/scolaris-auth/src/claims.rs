//! JWT claim structures.
//!
//! Every token carries a [`TokenPurpose`] so that one kind of token can never
//! be replayed where another is expected: a 2FA temporary token is not an
//! access token, a password-reset link is not an email-verification link.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    #[serde(rename = "2fa_verification")]
    TwoFactorVerification,
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::TwoFactorVerification => "2fa_verification",
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// Access token claims.
///
/// The role and resolved permission tokens are embedded so clients can adapt
/// their UI; the server re-resolves permissions from the database on every
/// authorized request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub role_id: Option<Uuid>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub purpose: TokenPurpose,
    /// Token ID, used for revocation on logout
    pub jti: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// Claims of refresh, 2FA and email-link tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurposeClaims {
    pub sub: String,
    pub email: String,
    pub purpose: TokenPurpose,
    pub jti: Uuid,
    pub exp: usize,
    pub iat: usize,
}

impl PurposeClaims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_serializes_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&TokenPurpose::TwoFactorVerification).unwrap(),
            r#""2fa_verification""#
        );
        assert_eq!(
            serde_json::to_string(&TokenPurpose::PasswordReset).unwrap(),
            r#""password_reset""#
        );
        for purpose in [
            TokenPurpose::Access,
            TokenPurpose::Refresh,
            TokenPurpose::TwoFactorVerification,
            TokenPurpose::EmailVerification,
            TokenPurpose::PasswordReset,
        ] {
            let json = serde_json::to_string(&purpose).unwrap();
            assert_eq!(json, format!(r#""{}""#, purpose.as_str()));
        }
    }

    #[test]
    fn test_claims_without_permissions_deserialize() {
        let jti = Uuid::new_v4();
        let json = format!(
            r#"{{"sub":"u-1","email":"a@b.c","purpose":"2fa_verification","jti":"{}","exp":9999999999,"iat":1}}"#,
            jti
        );
        let claims: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims.purpose, TokenPurpose::TwoFactorVerification);
        assert!(claims.permissions.is_empty());
        assert!(claims.role_id.is_none());
        assert_eq!(claims.jti, jti);
    }

    #[test]
    fn test_purpose_claims_user_id() {
        let id = Uuid::new_v4();
        let claims = PurposeClaims {
            sub: id.to_string(),
            email: "a@b.c".into(),
            purpose: TokenPurpose::Refresh,
            jti: Uuid::new_v4(),
            exp: 1,
            iat: 0,
        };
        assert_eq!(claims.user_id(), Some(id));
    }
}
