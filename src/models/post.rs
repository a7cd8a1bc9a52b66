use crate::entities::post_entity;
use crate::models::ExpenseResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub expense_id: i64,
    #[schema(example = "오늘의 라떼")]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModifyPostRequest {
    pub content: String,
}

/// 帖子列表项
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostBasicResponse {
    pub id: i64,
    pub expense_id: i64,
    pub content: String,
    pub love_count: u64,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
}

impl PostBasicResponse {
    pub fn new(m: post_entity::Model, love_count: u64, comment_count: u64) -> Self {
        Self {
            id: m.id,
            expense_id: m.expense_id,
            content: m.content,
            love_count,
            comment_count,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostDetailResponse {
    pub id: i64,
    pub content: String,
    /// 帖子作者，即所包装消费记录的所有者
    pub member_id: i64,
    pub expense: ExpenseResponse,
    pub love_count: u64,
    pub comment_count: u64,
    /// 仅在携带有效访问令牌时返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
