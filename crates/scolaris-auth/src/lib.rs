//! # Scolaris Auth
//!
//! JWT claims and token helpers.
//!
//! - [`claims`]: claim structures and token purposes
//! - [`jwt`]: signing and verification

pub mod claims;
pub mod jwt;

pub use claims::{Claims, PurposeClaims, TokenPurpose};
pub use jwt::{
    create_access_token, create_purpose_token, create_refresh_token, create_two_factor_token,
    verify_purpose_token, verify_token,
};
