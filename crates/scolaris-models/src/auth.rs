//! Authentication domain models and DTOs.
//!
//! This module contains the data structures used by registration, login,
//! token refresh, email verification and password reset flows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::User;

/// Self-service registration. New accounts get the Student role.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    #[schema(example = "Salma")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    #[schema(example = "Benali")]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "salma.benali@scolaris.ma")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "password123")]
    pub password: String,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 20, message = "Phone number must not exceed 20 characters"))]
    pub phone_number: Option<String>,
    #[validate(length(max = 255, message = "Address must not exceed 255 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 10, message = "Zip code must not exceed 10 characters"))]
    pub zip_code: Option<String>,
}

/// Login request with email and password.
///
/// If the account has 2FA enabled, a successful password check returns a
/// [`TwoFactorRequiredResponse`] instead of a [`LoginResponse`].
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Successful login: tokens, the user, their role and resolved permissions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TwoFactorRequiredResponse {
    pub requires_2fa: bool,
    /// Short-lived token to submit with the TOTP or backup code
    pub temp_token: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@scolaris.ma")]
    pub email: String,
}

/// The reset token travels in the path; the body only carries the password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "newpassword123")]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

/// Generic success message response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Salma".to_string(),
            last_name: "Benali".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            birth_date: None,
            phone_number: None,
            address: None,
            zip_code: None,
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(register("password123", "salma@scolaris.ma").validate().is_ok());
    }

    #[test]
    fn test_register_request_short_password() {
        let errors = register("short", "salma@scolaris.ma").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_request_invalid_email() {
        let errors = register("password123", "salma").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_login_request_requires_password() {
        let req = LoginRequest {
            email: "a@scolaris.ma".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_reset_password_request_min_length() {
        assert!(
            ResetPasswordRequest {
                new_password: "1234567".to_string()
            }
            .validate()
            .is_err()
        );
        assert!(
            ResetPasswordRequest {
                new_password: "12345678".to_string()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_two_factor_required_response_shape() {
        let value = serde_json::to_value(TwoFactorRequiredResponse {
            requires_2fa: true,
            temp_token: "tmp".to_string(),
            message: "2FA verification required".to_string(),
        })
        .unwrap();
        assert_eq!(value["requires_2fa"], true);
        assert_eq!(value["temp_token"], "tmp");
    }
}
