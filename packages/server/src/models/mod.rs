pub mod auth;
pub mod internship;
