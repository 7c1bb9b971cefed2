mod auth;
mod faculty;
mod files;
mod submission;
