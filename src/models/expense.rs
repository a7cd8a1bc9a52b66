use crate::entities::{expense_entity, expense_image_entity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateExpenseRequest {
    #[schema(example = "coffee")]
    pub category: String,
    #[schema(example = "Starbucks")]
    pub brand: String,
    #[schema(example = 4500)]
    pub price: i32,
    pub memo: Option<String>,
    #[serde(default)]
    pub tumbler: bool,
    pub taste: Option<String>,
    pub mood: Option<String>,
    pub bean: Option<String>,
    pub like_hate: Option<i32>,
    pub payment: Option<String>,
    #[schema(example = "2025-05-01")]
    pub date: NaiveDate,
}

/// 消费记录的部分更新：每个可变字段一个 Option，`None` 表示保持原值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExpensePatch {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<i32>,
    pub memo: Option<String>,
    pub tumbler: Option<bool>,
    pub taste: Option<String>,
    pub mood: Option<String>,
    pub bean: Option<String>,
    pub like_hate: Option<i32>,
    pub payment: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpenseQuery {
    /// 按月份过滤，格式 YYYYMM，例如 202505
    pub date: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseImageResponse {
    pub id: i64,
    pub stored_filename: String,
    pub original_filename: String,
    /// 图片下载地址
    pub url: String,
}

impl From<expense_image_entity::Model> for ExpenseImageResponse {
    fn from(m: expense_image_entity::Model) -> Self {
        Self {
            id: m.id,
            url: format!("/api/v1/images/{}", m.stored_filename),
            stored_filename: m.stored_filename,
            original_filename: m.original_filename,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: i64,
    pub member_id: i64,
    pub category: String,
    pub brand: String,
    pub price: i32,
    pub memo: Option<String>,
    pub tumbler: bool,
    pub taste: Option<String>,
    pub mood: Option<String>,
    pub bean: Option<String>,
    pub like_hate: Option<i32>,
    pub payment: Option<String>,
    pub date: NaiveDate,
    pub images: Vec<ExpenseImageResponse>,
}

impl ExpenseResponse {
    pub fn new(m: expense_entity::Model, images: Vec<expense_image_entity::Model>) -> Self {
        Self {
            id: m.id,
            member_id: m.member_id,
            category: m.category,
            brand: m.brand,
            price: m.price,
            memo: m.memo,
            tumbler: m.tumbler,
            taste: m.taste,
            mood: m.mood,
            bean: m.bean,
            like_hate: m.like_hate,
            payment: m.payment,
            date: m.date,
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}

/// 上传的单个文件（已读入内存）
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_filename: String,
    pub bytes: Vec<u8>,
}

/// 单个文件的处理结果；失败时 `error` 有值，其余文件不受影响
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageUploadResult {
    pub original_filename: String,
    pub stored_filename: Option<String>,
    pub image_id: Option<i64>,
    pub error: Option<String>,
}

impl ImageUploadResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateExpenseResponse {
    pub id: i64,
    pub message: String,
    pub images: Vec<ImageUploadResult>,
}

/// 月度消费合计及排名（合计越高排名越靠前）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyExpenseTotal {
    #[schema(example = "2025-05")]
    pub year_month: String,
    pub total: i64,
    pub rank: u32,
}

/// 待下载的图片
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: &'static str,
    pub content_disposition: String,
    pub bytes: Vec<u8>,
}
