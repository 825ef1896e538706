//! # Scolaris Config
//!
//! Configuration structures loaded from environment variables. Every
//! struct has a `from_env()` constructor falling back to development
//! defaults.
//!
//! - [`jwt`]: token signing secret and lifetimes
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP settings
//! - [`rate_limit`]: per-IP request limits
//! - [`session`]: cookie session lifetime
//! - [`storage`]: upload directory and limits

pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod session;
pub mod storage;

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use session::SessionConfig;
pub use storage::StorageConfig;
