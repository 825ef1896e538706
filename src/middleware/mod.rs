//! Request extractors for authentication and authorization.
//!
//! - [`auth`]: `AuthUser` and the `Require*` permission extractors
//! - [`session`]: the cookie session opened by login
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireGradeCreate};
//!
//! // any authenticated caller
//! async fn profile(auth_user: AuthUser) -> impl IntoResponse { ... }
//!
//! // rejected with 403 unless the caller holds "grade:create"
//! async fn create_grade(RequireGradeCreate(auth_user): RequireGradeCreate) -> impl IntoResponse { ... }
//! ```

pub mod auth;
pub mod session;
