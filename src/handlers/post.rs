use crate::middlewares::current_member_id;
use crate::models::*;
use crate::services::{LoveService, PostService};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/posts",
    tag = "post",
    params(PaginationParams),
    responses(
        (status = 200, description = "获取帖子列表成功"),
        (status = 500, description = "服务器内部错误")
    )
)]
pub async fn get_posts(
    post_service: web::Data<PostService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match post_service.get_all_posts(&query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "post",
    params(
        ("id" = i64, Path, description = "帖子ID")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取帖子详情成功；携带有效 token 时返回 liked", body = PostDetailResponse),
        (status = 404, description = "帖子不存在")
    )
)]
pub async fn get_post(
    post_service: web::Data<PostService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match post_service.get_post_detail(path.into_inner(), bearer).await {
        Ok(post) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": post
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/posts",
    tag = "post",
    request_body = CreatePostRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发帖成功", body = PostDetailResponse),
        (status = 400, description = "该消费记录已发帖或内容为空"),
        (status = 404, description = "消费记录不存在")
    )
)]
pub async fn create_post(
    post_service: web::Data<PostService>,
    req: HttpRequest,
    request: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match post_service.create(request.into_inner(), member_id).await {
        Ok(post) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": post,
            "message": CREATED_MESSAGE
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/posts/{id}",
    tag = "post",
    params(
        ("id" = i64, Path, description = "帖子ID")
    ),
    request_body = ModifyPostRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = PostDetailResponse),
        (status = 400, description = "非作者或内容为空"),
        (status = 404, description = "帖子不存在")
    )
)]
pub async fn modify_post(
    post_service: web::Data<PostService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ModifyPostRequest>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match post_service
        .modify(path.into_inner(), member_id, request.into_inner())
        .await
    {
        Ok(post) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": post,
            "message": UPDATED_MESSAGE
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "post",
    params(
        ("id" = i64, Path, description = "帖子ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功（评论与点赞一并删除）", body = ConfirmationResponse),
        (status = 400, description = "非作者"),
        (status = 404, description = "帖子不存在")
    )
)]
pub async fn delete_post(
    post_service: web::Data<PostService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match post_service.delete(path.into_inner(), member_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/posts/{id}/love",
    tag = "post",
    params(
        ("id" = i64, Path, description = "帖子ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "点赞成功", body = LoveResponse),
        (status = 400, description = "已点赞"),
        (status = 404, description = "帖子不存在")
    )
)]
pub async fn love_post(
    love_service: web::Data<LoveService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match love_service.love(path.into_inner(), member_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/posts/{id}/love",
    tag = "post",
    params(
        ("id" = i64, Path, description = "帖子ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "取消点赞成功", body = LoveResponse),
        (status = 404, description = "未点赞")
    )
)]
pub async fn unlove_post(
    love_service: web::Data<LoveService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match love_service.unlove(path.into_inner(), member_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn post_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(get_posts))
            .route("", web::post().to(create_post))
            .route("/{id}", web::get().to(get_post))
            .route("/{id}", web::patch().to(modify_post))
            .route("/{id}", web::delete().to(delete_post))
            .route("/{id}/love", web::post().to(love_post))
            .route("/{id}/love", web::delete().to(unlove_post)),
    );
}
