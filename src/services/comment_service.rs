use crate::entities::{comment_entity as comments, post_entity as posts};
use crate::error::{AppError, AppResult};
use crate::services::post_service::validate_content;
use crate::models::{
    CommentRequest, CommentResponse, ConfirmationResponse, PaginatedResponse, PaginationParams,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct CommentService {
    pool: DatabaseConnection,
}

impl CommentService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 分页获取帖子的评论（按时间正序）
    pub async fn list(
        &self,
        post_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CommentResponse>> {
        self.ensure_post(post_id).await?;

        let base_query = comments::Entity::find().filter(comments::Column::PostId.eq(post_id));
        let total = base_query.clone().count(&self.pool).await?;

        let items = base_query
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn create(
        &self,
        post_id: i64,
        member_id: i64,
        request: CommentRequest,
    ) -> AppResult<CommentResponse> {
        self.ensure_post(post_id).await?;
        validate_content(&request.content)?;

        let now = Utc::now();
        let comment = comments::ActiveModel {
            post_id: Set(post_id),
            member_id: Set(member_id),
            content: Set(request.content),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(comment.into())
    }

    /// 修改评论（仅评论者本人）
    pub async fn modify(
        &self,
        comment_id: i64,
        member_id: i64,
        request: CommentRequest,
    ) -> AppResult<CommentResponse> {
        let comment = self.find_own_comment(comment_id, member_id).await?;
        validate_content(&request.content)?;

        let mut model = comment.into_active_model();
        model.content = Set(request.content);
        model.updated_at = Set(Utc::now());
        let comment = model.update(&self.pool).await?;

        Ok(comment.into())
    }

    /// 删除评论（仅评论者本人）
    pub async fn delete(&self, comment_id: i64, member_id: i64) -> AppResult<ConfirmationResponse> {
        let comment = self.find_own_comment(comment_id, member_id).await?;

        comments::Entity::delete_by_id(comment.id)
            .exec(&self.pool)
            .await?;

        Ok(ConfirmationResponse::deleted(comment.id))
    }

    async fn ensure_post(&self, post_id: i64) -> AppResult<()> {
        posts::Entity::find_by_id(post_id)
            .one(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    async fn find_own_comment(
        &self,
        comment_id: i64,
        member_id: i64,
    ) -> AppResult<comments::Model> {
        let comment = comments::Entity::find_by_id(comment_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if comment.member_id != member_id {
            return Err(AppError::ValidationError(
                "Only the writer can change this comment".to_string(),
            ));
        }
        Ok(comment)
    }
}
