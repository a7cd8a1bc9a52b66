pub mod file_storage;
pub mod jwt;

pub use jwt::*;
