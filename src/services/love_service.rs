use crate::entities::{love_entity as loves, post_entity as posts};
use crate::error::{AppError, AppResult};
use crate::models::LoveResponse;
use crate::services::post_service::{count_loves, has_loved};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

#[derive(Clone)]
pub struct LoveService {
    pool: DatabaseConnection,
}

impl LoveService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 点赞；同一会员对同一帖子只能点赞一次
    pub async fn love(&self, post_id: i64, member_id: i64) -> AppResult<LoveResponse> {
        posts::Entity::find_by_id(post_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if has_loved(&self.pool, post_id, member_id).await? {
            return Err(already_loved());
        }

        loves::ActiveModel {
            post_id: Set(post_id),
            member_id: Set(member_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| match e.sql_err() {
            // 重复点击时由 (post_id, member_id) 唯一索引兜底
            Some(SqlErr::UniqueConstraintViolation(_)) => already_loved(),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::NotFound("Post not found".to_string())
            }
            _ => e.into(),
        })?;

        Ok(LoveResponse {
            post_id,
            loved: true,
            love_count: count_loves(&self.pool, post_id).await?,
        })
    }

    pub async fn unlove(&self, post_id: i64, member_id: i64) -> AppResult<LoveResponse> {
        let result = loves::Entity::delete_many()
            .filter(loves::Column::PostId.eq(post_id))
            .filter(loves::Column::MemberId.eq(member_id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Love not found".to_string()));
        }

        Ok(LoveResponse {
            post_id,
            loved: false,
            love_count: count_loves(&self.pool, post_id).await?,
        })
    }
}

fn already_loved() -> AppError {
    AppError::ValidationError("Post is already loved by this member".to_string())
}
