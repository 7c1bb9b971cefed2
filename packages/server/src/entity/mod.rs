pub mod credential;
pub mod student;
