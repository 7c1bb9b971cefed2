pub mod auth;
pub mod faculty;
pub mod files;
pub mod student;
