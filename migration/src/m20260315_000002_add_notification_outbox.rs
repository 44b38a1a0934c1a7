//! 添加通知发件箱表
//!
//! 审核结果邮件先写入 notification_outbox，由外部投递进程发送并回填 sent_at。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NotificationOutbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationOutbox::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NotificationOutbox::Kind).text().not_null())
                    .col(ColumnDef::new(NotificationOutbox::Recipient).text().not_null())
                    .col(ColumnDef::new(NotificationOutbox::Sender).text().null())
                    .col(ColumnDef::new(NotificationOutbox::Subject).text().not_null())
                    .col(ColumnDef::new(NotificationOutbox::Body).text().not_null())
                    .col(ColumnDef::new(NotificationOutbox::SubmissionId).text().null())
                    .col(
                        ColumnDef::new(NotificationOutbox::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NotificationOutbox::SentAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // 投递进程按 sent_at IS NULL 拉取待发送邮件
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notification_outbox_sent_at")
                    .table(NotificationOutbox::Table)
                    .col(NotificationOutbox::SentAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationOutbox::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum NotificationOutbox {
    Table,
    Id,
    Kind,
    Recipient,
    Sender,
    Subject,
    Body,
    SubmissionId,
    CreatedAt,
    SentAt,
}
