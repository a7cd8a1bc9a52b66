pub mod auth_service;
pub mod comment_service;
pub mod expense_service;
pub mod love_service;
pub mod member_service;
pub mod post_service;

pub use auth_service::AuthService;
pub use comment_service::CommentService;
pub use expense_service::ExpenseService;
pub use love_service::LoveService;
pub use member_service::MemberService;
pub use post_service::PostService;
