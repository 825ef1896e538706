//! Shared helpers used by the feature modules.
//!
//! - [`db`]: constraint-violation mapping and dynamic filter building
//! - [`email`]: outgoing mail through SMTP

pub mod db;
pub mod email;
