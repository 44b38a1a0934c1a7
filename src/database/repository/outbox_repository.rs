use crate::entity::notification_outbox;
use crate::entity::prelude::*;
use sea_orm::*;

/// 待写入发件箱的邮件
#[derive(Debug, Clone)]
pub struct NewOutboxMessage {
    pub kind: String,
    pub recipient: String,
    pub sender: Option<String>,
    pub subject: String,
    pub body: String,
    pub submission_id: Option<String>,
}

/// 通知发件箱仓库
pub struct OutboxRepository;

impl OutboxRepository {
    /// 写入一封待发送邮件
    pub async fn enqueue(db: &DatabaseConnection, message: NewOutboxMessage) -> Result<i32, DbErr> {
        let record = notification_outbox::ActiveModel {
            id: NotSet,
            kind: Set(message.kind),
            recipient: Set(message.recipient),
            sender: Set(message.sender),
            subject: Set(message.subject),
            body: Set(message.body),
            submission_id: Set(message.submission_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            sent_at: Set(None),
        };
        let result = record.insert(db).await?;
        Ok(result.id)
    }

    /// 获取尚未发送的邮件（按写入顺序）
    pub async fn find_unsent(
        db: &DatabaseConnection,
        limit: u64,
    ) -> Result<Vec<notification_outbox::Model>, DbErr> {
        NotificationOutbox::find()
            .filter(notification_outbox::Column::SentAt.is_null())
            .order_by_asc(notification_outbox::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    /// 标记邮件已发送
    pub async fn mark_sent(db: &DatabaseConnection, id: i32) -> Result<(), DbErr> {
        let record = NotificationOutbox::find_by_id(id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Outbox record not found".to_string()))?;

        let mut active: notification_outbox::ActiveModel = record.into();
        active.sent_at = Set(Some(chrono::Utc::now().timestamp()));
        active.update(db).await?;
        Ok(())
    }

    /// 获取某条投稿相关的全部邮件
    pub async fn find_by_submission(
        db: &DatabaseConnection,
        submission_id: &str,
    ) -> Result<Vec<notification_outbox::Model>, DbErr> {
        NotificationOutbox::find()
            .filter(notification_outbox::Column::SubmissionId.eq(submission_id))
            .order_by_asc(notification_outbox::Column::Id)
            .all(db)
            .await
    }
}
