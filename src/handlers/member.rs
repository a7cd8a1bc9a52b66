use crate::middlewares::current_member_id;
use crate::models::*;
use crate::services::MemberService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/members/me",
    tag = "member",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取会员资料成功", body = MemberResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "会员不存在")
    )
)]
pub async fn get_me(
    member_service: web::Data<MemberService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match member_service.get_member(member_id).await {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/members/me",
    tag = "member",
    request_body = MemberPatch,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = MemberResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_me(
    member_service: web::Data<MemberService>,
    req: HttpRequest,
    request: web::Json<MemberPatch>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match member_service
        .update_member(member_id, request.into_inner())
        .await
    {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member,
            "message": UPDATED_MESSAGE
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn member_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/members")
            .route("/me", web::get().to(get_me))
            .route("/me", web::patch().to(update_me)),
    );
}
