pub mod filesystem;

pub use filesystem::LocalFileStore;
