use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::middlewares::current_member_id;
use crate::models::*;
use crate::services::ExpenseService;
use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use futures_util::TryStreamExt;
use serde_json::json;

const DATA_FIELD: &str = "data";
const FILES_FIELD: &str = "files";

#[utoipa::path(
    get,
    path = "/expenses",
    tag = "expense",
    params(ExpenseQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取消费记录成功", body = Vec<ExpenseResponse>),
        (status = 400, description = "月份格式错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_expenses(
    expense_service: web::Data<ExpenseService>,
    req: HttpRequest,
    query: web::Query<ExpenseQuery>,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match expense_service.get_expenses(member_id, query.date).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/expenses",
    tag = "expense",
    request_body(
        content = CreateExpenseRequest,
        content_type = "multipart/form-data",
        description = "`data` 字段为消费记录 JSON，`files` 字段可重复出现"
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "登记成功，附带每个文件的处理结果", body = CreateExpenseResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn put_expense(
    expense_service: web::Data<ExpenseService>,
    storage: web::Data<StorageConfig>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    let (request, files) = match read_expense_form(payload, storage.max_upload_size).await {
        Ok(form) => form,
        Err(e) => return Ok(e.error_response()),
    };

    match expense_service.put_expense(files, request, member_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 读取 multipart 表单：一个 `data` JSON 字段和任意个 `files` 文件字段
async fn read_expense_form(
    mut payload: Multipart,
    max_upload_size: usize,
) -> AppResult<(CreateExpenseRequest, Vec<UploadedFile>)> {
    let mut data: Option<Vec<u8>> = None;
    let mut files = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > max_upload_size {
                return Err(AppError::ValidationError(format!(
                    "Field `{name}` exceeds the upload limit of {max_upload_size} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            DATA_FIELD => data = Some(bytes),
            FILES_FIELD => match filename {
                Some(original_filename) if !original_filename.is_empty() => {
                    files.push(UploadedFile {
                        original_filename,
                        bytes,
                    })
                }
                // 浏览器在未选择文件时也会发送空的 files 字段
                _ => {}
            },
            other => log::debug!("Ignoring unknown multipart field `{other}`"),
        }
    }

    let data = data.ok_or_else(|| {
        AppError::ValidationError(format!("Missing multipart field `{DATA_FIELD}`"))
    })?;
    let request: CreateExpenseRequest = serde_json::from_slice(&data)?;
    Ok((request, files))
}

fn multipart_error(err: actix_multipart::MultipartError) -> AppError {
    AppError::ValidationError(format!("Malformed multipart payload: {err}"))
}

#[utoipa::path(
    patch,
    path = "/expenses/{id}",
    tag = "expense",
    params(
        ("id" = i64, Path, description = "消费记录ID")
    ),
    request_body = ExpensePatch,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = ConfirmationResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "消费记录不存在")
    )
)]
pub async fn update_expense(
    expense_service: web::Data<ExpenseService>,
    path: web::Path<i64>,
    request: web::Json<ExpensePatch>,
) -> Result<HttpResponse> {
    match expense_service
        .update(path.into_inner(), request.into_inner())
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
    delete,
    path = "/expenses/{id}",
    tag = "expense",
    params(
        ("id" = i64, Path, description = "消费记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功", body = ConfirmationResponse),
        (status = 400, description = "该消费记录已发帖"),
        (status = 404, description = "消费记录不存在")
    )
)]
pub async fn delete_expense(
    expense_service: web::Data<ExpenseService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match expense_service.delete(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/expenses/images/{id}",
    tag = "expense",
    params(
        ("id" = i64, Path, description = "图片ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功", body = ConfirmationResponse),
        (status = 404, description = "图片不存在")
    )
)]
pub async fn delete_image(
    expense_service: web::Data<ExpenseService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match expense_service.delete_image(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/expenses/monthly-totals",
    tag = "expense",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "按月合计及排名", body = Vec<MonthlyExpenseTotal>),
        (status = 401, description = "未授权")
    )
)]
pub async fn monthly_totals(
    expense_service: web::Data<ExpenseService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let member_id = match current_member_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match expense_service.monthly_totals(member_id).await {
        Ok(totals) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": totals
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/images/{filename}",
    tag = "expense",
    params(
        ("filename" = String, Path, description = "存储文件名")
    ),
    responses(
        (status = 200, description = "图片内容（attachment 下载）"),
        (status = 404, description = "图片不存在")
    )
)]
pub async fn download_image(
    expense_service: web::Data<ExpenseService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match expense_service.get_image(&path.into_inner()).await {
        Ok(image) => Ok(HttpResponse::Ok()
            .content_type(image.content_type)
            .insert_header((header::CONTENT_DISPOSITION, image.content_disposition))
            .body(image.bytes)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn expense_config(cfg: &mut web::ServiceConfig) {
    // 固定路径需先于 /{id} 注册
    cfg.service(
        web::scope("/expenses")
            .route("", web::get().to(get_expenses))
            .route("", web::post().to(put_expense))
            .route("/monthly-totals", web::get().to(monthly_totals))
            .route("/images/{id}", web::delete().to(delete_image))
            .route("/{id}", web::patch().to(update_expense))
            .route("/{id}", web::delete().to(delete_expense)),
    )
    .route("/images/{filename}", web::get().to(download_image));
}
