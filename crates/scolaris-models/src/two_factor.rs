//! Two-factor authentication DTOs.
//!
//! Enrollment is two-step: `generate` stores a fresh secret with 2FA still
//! disabled, then `verify-setup` checks a first code and turns it on.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateTwoFactorResponse {
    /// The TOTP secret key (base32 encoded)
    pub secret: String,
    /// `data:image/png;base64,...` QR code for authenticator apps
    pub qr_code_url: String,
    /// The `otpauth://` URL encoded in the QR code
    pub otpauth_url: String,
    /// Single-use recovery codes, shown once
    pub backup_codes: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyTwoFactorSetupRequest {
    #[validate(length(equal = 6, message = "Token must be 6 digits"))]
    #[schema(example = "123456")]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DisableTwoFactorRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TwoFactorStatusResponse {
    pub enabled: bool,
    pub backup_codes_remaining: i64,
}

/// Second login step: the temporary token plus a TOTP code or backup code.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyTwoFactorLoginRequest {
    #[validate(length(min = 1, message = "Temporary token is required"))]
    pub temp_token: String,
    #[validate(length(min = 6, max = 10, message = "Invalid 2FA token"))]
    #[schema(example = "123456")]
    pub token: String,
}
