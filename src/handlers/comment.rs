use crate::middlewares::current_member_id;
use crate::models::*;
use crate::services::CommentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/posts/{id}/comments",
    tag = "comment",
    params(
        ("id" = i64, Path, description = "帖子ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "获取评论列表成功"),
        (status = 404, description = "帖子不存在")
    )
)]
pub async fn get_comments(
    comment_service: web::Data<CommentService>,
    path: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match comment_service
        .list(path.into_inner(), &query.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/posts/{id}/comments",
    tag = "comment",
    params(
        ("id" = i64, Path, description = "帖子ID")
    ),
    request_body = CommentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "评论成功", body = CommentResponse),
        (status = 400, description = "内容为空"),
        (status = 404, description = "帖子不存在")
    )
)]
pub async fn create_comment(
    comment_service: web::Data<CommentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match comment_service
        .create(path.into_inner(), member_id, request.into_inner())
        .await
    {
        Ok(comment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": comment,
            "message": CREATED_MESSAGE
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/comments/{id}",
    tag = "comment",
    params(
        ("id" = i64, Path, description = "评论ID")
    ),
    request_body = CommentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = CommentResponse),
        (status = 400, description = "非评论者或内容为空"),
        (status = 404, description = "评论不存在")
    )
)]
pub async fn modify_comment(
    comment_service: web::Data<CommentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match comment_service
        .modify(path.into_inner(), member_id, request.into_inner())
        .await
    {
        Ok(comment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": comment,
            "message": UPDATED_MESSAGE
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "comment",
    params(
        ("id" = i64, Path, description = "评论ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功", body = ConfirmationResponse),
        (status = 400, description = "非评论者"),
        (status = 404, description = "评论不存在")
    )
)]
pub async fn delete_comment(
    comment_service: web::Data<CommentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match comment_service.delete(path.into_inner(), member_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn comment_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts/{id}/comments", web::get().to(get_comments))
        .route("/posts/{id}/comments", web::post().to(create_comment))
        .service(
            web::scope("/comments")
                .route("/{id}", web::patch().to(modify_comment))
                .route("/{id}", web::delete().to(delete_comment)),
        );
}
