use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::Gender;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::member::get_me,
        handlers::member::update_me,
        handlers::expense::get_expenses,
        handlers::expense::put_expense,
        handlers::expense::update_expense,
        handlers::expense::delete_expense,
        handlers::expense::delete_image,
        handlers::expense::monthly_totals,
        handlers::expense::download_image,
        handlers::post::get_posts,
        handlers::post::get_post,
        handlers::post::create_post,
        handlers::post::modify_post,
        handlers::post::delete_post,
        handlers::post::love_post,
        handlers::post::unlove_post,
        handlers::comment::get_comments,
        handlers::comment::create_comment,
        handlers::comment::modify_comment,
        handlers::comment::delete_comment,
    ),
    components(
        schemas(
            Gender,
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            MemberResponse,
            MemberPatch,
            CreateExpenseRequest,
            ExpensePatch,
            ExpenseResponse,
            ExpenseImageResponse,
            ImageUploadResult,
            CreateExpenseResponse,
            MonthlyExpenseTotal,
            CreatePostRequest,
            ModifyPostRequest,
            PostBasicResponse,
            PostDetailResponse,
            CommentRequest,
            CommentResponse,
            LoveResponse,
            ConfirmationResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "登录与令牌刷新"),
        (name = "member", description = "会员资料"),
        (name = "expense", description = "咖啡消费记录与图片"),
        (name = "post", description = "帖子与点赞"),
        (name = "comment", description = "评论")
    ),
    info(
        title = "Monthly Coffee API",
        version = "1.0.0",
        description = "Monthly Coffee Backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
