use crate::entities::{
    comment_entity as comments, expense_entity as expenses, expense_image_entity as expense_images,
    love_entity as loves, member_entity as members, post_entity as posts,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    ConfirmationResponse, CreatePostRequest, ExpenseResponse, ModifyPostRequest,
    PaginatedResponse, PaginationParams, PostBasicResponse, PostDetailResponse,
};
use crate::utils::JwtService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, TransactionTrait,
};

#[derive(Clone)]
pub struct PostService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl PostService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 分页获取帖子列表，附带点赞数与评论数
    pub async fn get_all_posts(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PostBasicResponse>> {
        let total = posts::Entity::find().count(&self.pool).await?;

        let models = posts::Entity::find()
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(models.len());
        for post in models {
            let love_count = count_loves(&self.pool, post.id).await?;
            let comment_count = count_comments(&self.pool, post.id).await?;
            items.push(PostBasicResponse::new(post, love_count, comment_count));
        }

        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 获取帖子详情。
    ///
    /// `bearer` 为 `Bearer <access token>` 且校验通过时，额外返回该会员是否点赞；
    /// 其他情况一律按匿名访问处理。
    pub async fn get_post_detail(
        &self,
        id: i64,
        bearer: Option<&str>,
    ) -> AppResult<PostDetailResponse> {
        let post = self.find_post(id).await?;

        let liked = match self.jwt_service.member_id_from_bearer(bearer) {
            Some(member_id) => Some(has_loved(&self.pool, post.id, member_id).await?),
            None => None,
        };

        self.build_detail(post, liked).await
    }

    /// 基于自己的消费记录发帖，每条消费记录只能发一篇
    pub async fn create(
        &self,
        request: CreatePostRequest,
        member_id: i64,
    ) -> AppResult<PostDetailResponse> {
        validate_content(&request.content)?;

        // 按 (id, member_id) 查找，所有权在查询时即被约束
        let expense = expenses::Entity::find()
            .filter(expenses::Column::Id.eq(request.expense_id))
            .filter(expenses::Column::MemberId.eq(member_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Expense not found for this member".to_string())
            })?;

        let already_posted = posts::Entity::find()
            .filter(posts::Column::ExpenseId.eq(expense.id))
            .count(&self.pool)
            .await?
            > 0;
        if already_posted {
            return Err(already_published());
        }

        let now = Utc::now();
        let post = posts::ActiveModel {
            expense_id: Set(expense.id),
            content: Set(request.content),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| match e.sql_err() {
            // 并发发帖时由唯一索引兜底
            Some(SqlErr::UniqueConstraintViolation(_)) => already_published(),
            // 查询后消费记录被删除
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::NotFound("Expense not found for this member".to_string())
            }
            _ => e.into(),
        })?;

        log::info!("Member {member_id} published post {} for expense {}", post.id, expense.id);

        let images = expense
            .find_related(expense_images::Entity)
            .all(&self.pool)
            .await?;

        Ok(PostDetailResponse {
            id: post.id,
            content: post.content,
            member_id: expense.member_id,
            expense: ExpenseResponse::new(expense, images),
            love_count: 0,
            comment_count: 0,
            liked: None,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }

    /// 修改帖子内容（仅作者）
    pub async fn modify(
        &self,
        post_id: i64,
        member_id: i64,
        request: ModifyPostRequest,
    ) -> AppResult<PostDetailResponse> {
        let post = self.find_post(post_id).await?;
        self.check_post_author(&post, member_id).await?;
        validate_content(&request.content)?;

        let mut model = post.into_active_model();
        model.content = Set(request.content);
        model.updated_at = Set(Utc::now());
        let post = model.update(&self.pool).await?;

        self.build_detail(post, None).await
    }

    /// 删除帖子（仅作者）。
    ///
    /// 同一事务内先批量删除评论和点赞，再删除帖子本身。
    pub async fn delete(&self, post_id: i64, member_id: i64) -> AppResult<ConfirmationResponse> {
        let post = self.find_post(post_id).await?;
        self.check_post_author(&post, member_id).await?;

        let txn = self.pool.begin().await?;
        let removed_comments = comments::Entity::delete_many()
            .filter(comments::Column::PostId.eq(post.id))
            .exec(&txn)
            .await?
            .rows_affected;
        let removed_loves = loves::Entity::delete_many()
            .filter(loves::Column::PostId.eq(post.id))
            .exec(&txn)
            .await?
            .rows_affected;
        posts::Entity::delete_by_id(post.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Post {} deleted by {member_id}: {removed_comments} comments, {removed_loves} loves",
            post.id,
        );

        Ok(ConfirmationResponse::deleted(post.id))
    }

    /// 帖子的作者：帖子 -> 消费记录 -> 会员。
    ///
    /// 任一环节缺失视为数据完整性问题，返回 NotFound。
    pub async fn post_owner(&self, post: &posts::Model) -> AppResult<members::Model> {
        let expense = expenses::Entity::find_by_id(post.expense_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post refers to a missing expense".to_string()))?;

        members::Entity::find_by_id(expense.member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post belongs to a missing member".to_string()))
    }

    async fn check_post_author(&self, post: &posts::Model, member_id: i64) -> AppResult<()> {
        let owner = self.post_owner(post).await?;
        if owner.id != member_id {
            log::warn!(
                "Member {member_id} tried to change post {} owned by member {}",
                post.id,
                owner.id
            );
            return Err(AppError::ValidationError(
                "Only the author can change this post".to_string(),
            ));
        }
        Ok(())
    }

    async fn find_post(&self, id: i64) -> AppResult<posts::Model> {
        posts::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    async fn build_detail(
        &self,
        post: posts::Model,
        liked: Option<bool>,
    ) -> AppResult<PostDetailResponse> {
        let expense = post
            .find_related(expenses::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post refers to a missing expense".to_string()))?;
        let images = expense
            .find_related(expense_images::Entity)
            .all(&self.pool)
            .await?;
        let love_count = count_loves(&self.pool, post.id).await?;
        let comment_count = count_comments(&self.pool, post.id).await?;

        Ok(PostDetailResponse {
            id: post.id,
            content: post.content,
            member_id: expense.member_id,
            expense: ExpenseResponse::new(expense, images),
            love_count,
            comment_count,
            liked,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }
}

pub async fn count_loves<C: ConnectionTrait>(db: &C, post_id: i64) -> AppResult<u64> {
    Ok(loves::Entity::find()
        .filter(loves::Column::PostId.eq(post_id))
        .count(db)
        .await?)
}

pub async fn count_comments<C: ConnectionTrait>(db: &C, post_id: i64) -> AppResult<u64> {
    Ok(comments::Entity::find()
        .filter(comments::Column::PostId.eq(post_id))
        .count(db)
        .await?)
}

pub async fn has_loved<C: ConnectionTrait>(
    db: &C,
    post_id: i64,
    member_id: i64,
) -> AppResult<bool> {
    Ok(loves::Entity::find()
        .filter(loves::Column::PostId.eq(post_id))
        .filter(loves::Column::MemberId.eq(member_id))
        .count(db)
        .await?
        > 0)
}

fn already_published() -> AppError {
    AppError::ValidationError("Only one post can be published per expense".to_string())
}

pub(crate) fn validate_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::ValidationError(
            "content must not be empty".to_string(),
        ));
    }
    Ok(())
}
