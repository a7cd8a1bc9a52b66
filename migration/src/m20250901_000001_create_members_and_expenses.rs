use sea_orm_migration::prelude::*;

/// 会员
#[derive(DeriveIden)]
pub(crate) enum Members {
    Table,
    Id,
    Uid,
    Nickname,
    Birth,
    Gender,
    CreatedAt,
}

/// 消费记录
#[derive(DeriveIden)]
pub(crate) enum Expenses {
    Table,
    Id,
    MemberId,
    Category,
    Brand,
    Price,
    Memo,
    Tumbler,
    Taste,
    Mood,
    Bean,
    LikeHate,
    Payment,
    Date,
    CreatedAt,
}

/// 消费记录图片（仅元数据，文件本体在上传目录）
#[derive(DeriveIden)]
enum ExpenseImages {
    Table,
    Id,
    ExpenseId,
    StoredFilename,
    OriginalFilename,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Members::Uid)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Members::Nickname).string_len(64).not_null())
                    .col(ColumnDef::new(Members::Birth).date().null())
                    .col(ColumnDef::new(Members::Gender).string_len(16).null())
                    .col(
                        ColumnDef::new(Members::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::MemberId).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Category).string_len(64).not_null())
                    .col(ColumnDef::new(Expenses::Brand).string_len(128).not_null())
                    .col(ColumnDef::new(Expenses::Price).integer().not_null())
                    .col(ColumnDef::new(Expenses::Memo).text().null())
                    .col(
                        ColumnDef::new(Expenses::Tumbler)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::Taste).string_len(64).null())
                    .col(ColumnDef::new(Expenses::Mood).string_len(64).null())
                    .col(ColumnDef::new(Expenses::Bean).string_len(64).null())
                    .col(ColumnDef::new(Expenses::LikeHate).integer().null())
                    .col(ColumnDef::new(Expenses::Payment).string_len(32).null())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_member_id")
                            .from(Expenses::Table, Expenses::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_expenses_member_date")
                    .table(Expenses::Table)
                    .col(Expenses::MemberId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // 删除消费记录时图片只解除关联，由 delete_image 单独清理
        manager
            .create_table(
                Table::create()
                    .table(ExpenseImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseImages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseImages::ExpenseId).big_integer().null())
                    .col(
                        ColumnDef::new(ExpenseImages::StoredFilename)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseImages::OriginalFilename)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_images_expense_id")
                            .from(ExpenseImages::Table, ExpenseImages::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_expense_images_expense_id")
                    .table(ExpenseImages::Table)
                    .col(ExpenseImages::ExpenseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseImages::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
