//! # Scolaris Models
//!
//! Database rows, request DTOs and response DTOs for the Scolaris API.
//!
//! # Modules
//!
//! - [`auth`]: registration, login, token refresh and password reset
//! - [`two_factor`]: TOTP enrollment and second-step login
//! - [`users`], [`roles`], [`permissions`]: accounts and access control
//! - [`filieres`], [`niveaux`], [`groupes`], [`course_modules`]: academic hierarchy
//! - [`rooms`], [`events`], [`attendance_lists`], [`sessions`]: scheduling
//! - [`grades`], [`bulletins`], [`absences`]: results and attendance
//! - [`uploads`], [`opportunities`]: documents, resources and job offers
//!
//! # Example
//!
//! ```ignore
//! use scolaris_models::roles::system_roles;
//! use scolaris_models::sessions::TimeRange;
//!
//! if system_roles::is_system_role(&role_id) {
//!     return Err(AppError::bad_request(anyhow!("System roles cannot be deleted")));
//! }
//! ```

pub mod absences;
pub mod attendance_lists;
pub mod auth;
pub mod bulletins;
pub mod course_modules;
pub mod events;
pub mod filieres;
pub mod grades;
pub mod groupes;
pub mod niveaux;
pub mod opportunities;
pub mod permissions;
pub mod roles;
pub mod rooms;
pub mod sessions;
pub mod two_factor;
pub mod uploads;
pub mod users;

pub use auth::MessageResponse;
pub use roles::system_roles;
pub use users::{USER_COLUMNS, User, UserSummary};
