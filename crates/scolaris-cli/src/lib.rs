//! # Scolaris CLI
//!
//! Administration and seeding tools for development databases.
//!
//! ```ignore
//! use scolaris_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::default().with_students_per_groupe(30);
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
