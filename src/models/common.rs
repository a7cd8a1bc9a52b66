use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CREATED_MESSAGE: &str = "登记成功";
pub const UPDATED_MESSAGE: &str = "修改成功";
pub const DELETED_MESSAGE: &str = "删除成功";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// 增删改操作的确认信息：对象ID + 本地化状态文字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfirmationResponse {
    pub id: i64,
    #[schema(example = "删除成功")]
    pub message: String,
}

impl ConfirmationResponse {
    pub fn created(id: i64) -> Self {
        Self {
            id,
            message: CREATED_MESSAGE.to_string(),
        }
    }

    pub fn updated(id: i64) -> Self {
        Self {
            id,
            message: UPDATED_MESSAGE.to_string(),
        }
    }

    pub fn deleted(id: i64) -> Self {
        Self {
            id,
            message: DELETED_MESSAGE.to_string(),
        }
    }
}
