pub mod auth;
pub mod comment;
pub mod common;
pub mod expense;
pub mod member;
pub mod pagination;
pub mod post;

pub use auth::*;
pub use comment::*;
pub use common::*;
pub use expense::*;
pub use member::*;
pub use pagination::*;
pub use post::*;
