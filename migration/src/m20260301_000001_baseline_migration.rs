//! 基线迁移：创建投稿审核所需的全部核心表
//!
//! - users：开发者 / 管理员账户（开发者状态由此表提供）
//! - settings：站点配置（单行，ID 固定为 1）
//! - submissions：开发者投稿，元数据以 JSON 列形式嵌入
//! - games：已发布的游戏条目（投稿审核通过后的投影）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::DisplayName).text().not_null())
                    .col(ColumnDef::new(Users::Email).text().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .text()
                            .not_null()
                            .default("subscriber"),
                    )
                    .col(
                        ColumnDef::new(Users::DeveloperStatus)
                            .text()
                            .not_null()
                            .default("none"),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // 2. 站点设置表
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::SiteName).text().null())
                    .col(ColumnDef::new(Settings::SiteUrl).text().null())
                    .col(ColumnDef::new(Settings::NotificationSender).text().null())
                    .col(
                        ColumnDef::new(Settings::NotificationsEnabled)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Settings::TokenSecret).text().null())
                    .col(ColumnDef::new(Settings::MediaPath).text().null())
                    .to_owned(),
            )
            .await?;

        // 3. 投稿表（game_data / metadata / admin_data 为 JSON 文本）
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Submissions::Status)
                            .text()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Submissions::GameData).text().not_null())
                    .col(ColumnDef::new(Submissions::Metadata).text().not_null())
                    .col(ColumnDef::new(Submissions::AdminData).text().not_null())
                    .col(ColumnDef::new(Submissions::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Submissions::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submissions_user_id")
                    .table(Submissions::Table)
                    .col(Submissions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submissions_status")
                    .table(Submissions::Table)
                    .col(Submissions::Status)
                    .to_owned(),
            )
            .await?;

        // 4. 已发布游戏表
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Games::Name).text().not_null())
                    .col(ColumnDef::new(Games::Slug).text().not_null().unique_key())
                    .col(
                        ColumnDef::new(Games::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Games::DeveloperUserId).integer().null())
                    .col(ColumnDef::new(Games::SourceSubmissionId).text().null())
                    .col(ColumnDef::new(Games::TermMeta).text().not_null())
                    .col(ColumnDef::new(Games::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(Games::UpdatedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        log::info!("[MIGRATION] baseline schema created");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    DisplayName,
    Email,
    Role,
    DeveloperStatus,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    SiteName,
    SiteUrl,
    NotificationSender,
    NotificationsEnabled,
    TokenSecret,
    MediaPath,
}

#[derive(DeriveIden)]
enum Submissions {
    Table,
    Id,
    UserId,
    Status,
    GameData,
    Metadata,
    AdminData,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    Name,
    Slug,
    Description,
    DeveloperUserId,
    SourceSubmissionId,
    TermMeta,
    CreatedAt,
    UpdatedAt,
}
