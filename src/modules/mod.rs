pub mod absences;
pub mod attendance_lists;
pub mod auth;
pub mod bulletins;
pub mod course_modules;
pub mod documents;
pub mod events;
pub mod filieres;
pub mod grades;
pub mod groupes;
pub mod health;
pub mod niveaux;
pub mod opportunities;
pub mod permissions;
pub mod resources;
pub mod roles;
pub mod rooms;
pub mod sessions;
pub mod two_factor;
pub mod uploads;
pub mod users;
