pub mod auth;
pub mod comment;
pub mod expense;
pub mod member;
pub mod post;

pub use auth::auth_config;
pub use comment::comment_config;
pub use expense::expense_config;
pub use member::member_config;
pub use post::post_config;

use actix_web::web;

/// 注册 `/api/v1` 下的全部路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth_config)
            .configure(member_config)
            .configure(expense_config)
            // 评论路由需先于 /posts 作用域注册
            .configure(comment_config)
            .configure(post_config),
    );
}
