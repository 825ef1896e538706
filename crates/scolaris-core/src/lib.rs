//! # Scolaris Core
//!
//! Foundational types shared by every Scolaris crate:
//!
//! - [`errors`]: `AppError` and its HTTP response conversion
//! - [`pagination`]: `limit`/`offset`/`page` query handling
//! - [`password`]: bcrypt hashing
//! - [`permissions`]: `section:action` permission tokens and sets
//! - [`file_storage`]: upload storage backends
//! - [`serde`]: query-string deserialization helpers

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use permissions::{PermissionMode, PermissionSet};
