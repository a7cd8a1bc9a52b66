use crate::entities::{
    expense_entity as expenses, expense_image_entity as expense_images, member_entity as members,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CREATED_MESSAGE, ConfirmationResponse, CreateExpenseRequest, CreateExpenseResponse,
    ExpensePatch, ExpenseResponse, ImageFile, ImageUploadResult, MonthlyExpenseTotal, UploadedFile,
};
use crate::utils::file_storage;
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, LoaderTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct ExpenseService {
    pool: DatabaseConnection,
    upload_dir: PathBuf,
}

impl ExpenseService {
    pub fn new(pool: DatabaseConnection, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// 查询会员的消费记录，`date` 为 YYYYMM 时只返回该月的记录
    pub async fn get_expenses(
        &self,
        member_id: i64,
        date: Option<i32>,
    ) -> AppResult<Vec<ExpenseResponse>> {
        self.find_member(member_id).await?;

        let mut query =
            expenses::Entity::find().filter(expenses::Column::MemberId.eq(member_id));
        if let Some(year_month) = date {
            let (start, end) = month_range(year_month)?;
            query = query
                .filter(expenses::Column::Date.gte(start))
                .filter(expenses::Column::Date.lt(end));
        }

        let list = query
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .all(&self.pool)
            .await?;
        let images = list.load_many(expense_images::Entity, &self.pool).await?;

        Ok(list
            .into_iter()
            .zip(images)
            .map(|(expense, images)| ExpenseResponse::new(expense, images))
            .collect())
    }

    /// 登记消费记录并逐个保存上传的图片。
    ///
    /// 图片按顺序处理，单个文件失败只记录在结果列表中，
    /// 不影响其余文件，也不回滚已写入的消费记录。
    pub async fn put_expense(
        &self,
        files: Vec<UploadedFile>,
        request: CreateExpenseRequest,
        owner_id: i64,
    ) -> AppResult<CreateExpenseResponse> {
        let owner = self.find_member(owner_id).await?;
        validate_required(&request.category, "category")?;
        validate_required(&request.brand, "brand")?;
        validate_price(request.price)?;

        let expense = expenses::ActiveModel {
            member_id: Set(owner.id),
            category: Set(request.category),
            brand: Set(request.brand),
            price: Set(request.price),
            memo: Set(request.memo),
            tumbler: Set(request.tumbler),
            taste: Set(request.taste),
            mood: Set(request.mood),
            bean: Set(request.bean),
            like_hate: Set(request.like_hate),
            payment: Set(request.payment),
            date: Set(request.date),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        let mut images = Vec::with_capacity(files.len());
        for file in &files {
            images.push(self.store_image(expense.id, file).await);
        }

        let failed = images.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            log::warn!(
                "Expense {} created with {failed}/{} image uploads failed",
                expense.id,
                images.len()
            );
        }

        Ok(CreateExpenseResponse {
            id: expense.id,
            message: CREATED_MESSAGE.to_string(),
            images,
        })
    }

    async fn store_image(&self, expense_id: i64, file: &UploadedFile) -> ImageUploadResult {
        let stored_filename = file_storage::stored_filename(&file.original_filename);
        let original_filename = file_storage::original_stem(&file.original_filename);

        let outcome = async {
            let target = self.upload_dir.join(&stored_filename);
            // 同名文件直接覆盖
            tokio::fs::write(&target, &file.bytes).await?;

            let inserted = expense_images::ActiveModel {
                expense_id: Set(Some(expense_id)),
                stored_filename: Set(stored_filename.clone()),
                original_filename: Set(original_filename),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&self.pool)
            .await;

            let image = match inserted {
                Ok(image) => image,
                Err(e) => {
                    // 没有元数据行的文件无法再被访问，随即清理
                    if let Err(remove_err) = tokio::fs::remove_file(&target).await {
                        log::error!(
                            "Failed to remove orphaned upload {}: {remove_err}",
                            target.display()
                        );
                    }
                    return Err(AppError::from(e));
                }
            };
            Ok::<i64, AppError>(image.id)
        }
        .await;

        match outcome {
            Ok(image_id) => ImageUploadResult {
                original_filename: file.original_filename.clone(),
                stored_filename: Some(stored_filename),
                image_id: Some(image_id),
                error: None,
            },
            Err(e) => {
                log::error!(
                    "Failed to store image {} for expense {expense_id}: {e}",
                    file.original_filename
                );
                ImageUploadResult {
                    original_filename: file.original_filename.clone(),
                    stored_filename: None,
                    image_id: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// 部分更新：只覆盖 patch 中出现的字段
    pub async fn update(
        &self,
        expense_id: i64,
        patch: ExpensePatch,
    ) -> AppResult<ConfirmationResponse> {
        let expense = self.find_expense(expense_id).await?;
        if patch.is_empty() {
            return Ok(ConfirmationResponse::updated(expense.id));
        }

        if let Some(category) = &patch.category {
            validate_required(category, "category")?;
        }
        if let Some(brand) = &patch.brand {
            validate_required(brand, "brand")?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }

        let mut model = expense.into_active_model();
        if let Some(v) = patch.category {
            model.category = Set(v);
        }
        if let Some(v) = patch.brand {
            model.brand = Set(v);
        }
        if let Some(v) = patch.price {
            model.price = Set(v);
        }
        if let Some(v) = patch.memo {
            model.memo = Set(Some(v));
        }
        if let Some(v) = patch.tumbler {
            model.tumbler = Set(v);
        }
        if let Some(v) = patch.taste {
            model.taste = Set(Some(v));
        }
        if let Some(v) = patch.mood {
            model.mood = Set(Some(v));
        }
        if let Some(v) = patch.bean {
            model.bean = Set(Some(v));
        }
        if let Some(v) = patch.like_hate {
            model.like_hate = Set(Some(v));
        }
        if let Some(v) = patch.payment {
            model.payment = Set(Some(v));
        }
        if let Some(v) = patch.date {
            model.date = Set(v);
        }
        let updated = model.update(&self.pool).await?;

        Ok(ConfirmationResponse::updated(updated.id))
    }

    /// 删除消费记录。图片行只解除关联（expense_id 置空），需另行调用 `delete_image`。
    ///
    /// 已发帖的消费记录受 posts 外键约束保护，删除被拒绝。
    pub async fn delete(&self, expense_id: i64) -> AppResult<ConfirmationResponse> {
        let expense = self.find_expense(expense_id).await?;

        expenses::Entity::delete_by_id(expense.id)
            .exec(&self.pool)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    log::warn!("Refused to delete expense {}: it is published", expense.id);
                    AppError::ValidationError(
                        "Expense is published as a post; delete the post first".to_string(),
                    )
                }
                _ => e.into(),
            })?;

        Ok(ConfirmationResponse::deleted(expense.id))
    }

    /// 删除图片元数据，上传目录中的文件保留
    pub async fn delete_image(&self, image_id: i64) -> AppResult<ConfirmationResponse> {
        let image = expense_images::Entity::find_by_id(image_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        expense_images::Entity::delete_by_id(image.id)
            .exec(&self.pool)
            .await?;

        Ok(ConfirmationResponse::deleted(image.id))
    }

    /// 读取上传目录中的图片
    pub async fn get_image(&self, filename: &str) -> AppResult<ImageFile> {
        let path = file_storage::resolve_in(&self.upload_dir, filename)
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("Image not found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ImageFile {
            filename: filename.to_string(),
            content_type: file_storage::content_type_for(filename),
            content_disposition: file_storage::content_disposition(filename),
            bytes,
        })
    }

    /// 按月汇总消费金额并排名（并列同名次）
    pub async fn monthly_totals(&self, member_id: i64) -> AppResult<Vec<MonthlyExpenseTotal>> {
        self.find_member(member_id).await?;

        let list = expenses::Entity::find()
            .filter(expenses::Column::MemberId.eq(member_id))
            .all(&self.pool)
            .await?;

        let mut totals: BTreeMap<String, i64> = BTreeMap::new();
        for expense in list {
            let key = format!("{:04}-{:02}", expense.date.year(), expense.date.month());
            *totals.entry(key).or_default() += i64::from(expense.price);
        }

        Ok(rank_monthly_totals(totals))
    }

    async fn find_member(&self, member_id: i64) -> AppResult<members::Model> {
        members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
    }

    async fn find_expense(&self, expense_id: i64) -> AppResult<expenses::Model> {
        expenses::Entity::find_by_id(expense_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))
    }
}

/// YYYYMM -> [当月1日, 次月1日)
fn month_range(year_month: i32) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || {
        AppError::ValidationError(format!("Invalid month: {year_month}, expected YYYYMM"))
    };
    if year_month <= 0 {
        return Err(invalid());
    }
    let year = year_month / 100;
    let month = u32::try_from(year_month % 100).map_err(|_| invalid())?;

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((start, end))
}

fn rank_monthly_totals(totals: BTreeMap<String, i64>) -> Vec<MonthlyExpenseTotal> {
    let mut entries: Vec<(String, i64)> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let mut ranked = Vec::with_capacity(entries.len());
    let mut rank = 0u32;
    let mut previous: Option<i64> = None;
    for (year_month, total) in entries {
        if previous != Some(total) {
            rank += 1;
            previous = Some(total);
        }
        ranked.push(MonthlyExpenseTotal {
            year_month,
            total,
            rank,
        });
    }
    ranked
}

fn validate_required(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_price(price: i32) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::ValidationError(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}
