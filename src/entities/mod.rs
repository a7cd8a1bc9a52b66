pub mod comments;
pub mod expense_images;
pub mod expenses;
pub mod loves;
pub mod members;
pub mod posts;

pub use comments as comment_entity;
pub use expense_images as expense_image_entity;
pub use expenses as expense_entity;
pub use loves as love_entity;
pub use members as member_entity;
pub use members::Gender;
pub use posts as post_entity;
