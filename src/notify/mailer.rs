use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::database::repository::outbox_repository::{NewOutboxMessage, OutboxRepository};
use crate::notify::templates::NotificationKind;

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub kind: NotificationKind,
    pub to: String,
    pub from: Option<String>,
    pub subject: String,
    pub body: String,
    pub submission_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("收件人地址无效: {0}")]
    InvalidRecipient(String),

    #[error("邮件投递失败: {0}")]
    Transport(String),

    #[error("写入发件箱失败: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

/// 邮件发送服务
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// 写入 notification_outbox 表，由外部进程实际投递
#[derive(Clone)]
pub struct OutboxMailer {
    db: DatabaseConnection,
}

impl OutboxMailer {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if !message.to.contains('@') {
            return Err(MailError::InvalidRecipient(message.to.clone()));
        }

        let id = OutboxRepository::enqueue(
            &self.db,
            NewOutboxMessage {
                kind: message.kind.as_str().to_string(),
                recipient: message.to.clone(),
                sender: message.from.clone(),
                subject: message.subject.clone(),
                body: message.body.clone(),
                submission_id: message.submission_id.clone(),
            },
        )
        .await?;

        log::debug!("邮件已写入发件箱 #{} -> {}", id, message.to);
        Ok(())
    }
}

/// 只把邮件写入日志，用于没有投递进程的本地环境
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        log::info!(
            "[{}] {} -> {}: {}\n{}",
            message.kind.as_str(),
            message.from.as_deref().unwrap_or("-"),
            message.to,
            message.subject,
            message.body
        );
        Ok(())
    }
}

/// 选择邮件实现的环境变量，取值 `outbox`（默认）或 `log`
pub const MAILER_ENV: &str = "SISME_MAILER";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailerKind {
    Outbox,
    Log,
}

impl MailerKind {
    /// 解析环境变量取值，未设置或无法识别时使用发件箱
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "log" => MailerKind::Log,
            Some(v) if !v.is_empty() && v != "outbox" => {
                log::warn!("未知的邮件实现 {}，使用发件箱", v);
                MailerKind::Outbox
            }
            _ => MailerKind::Outbox,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var(MAILER_ENV).ok().as_deref())
    }

    pub fn build(self, db: &DatabaseConnection) -> Arc<dyn Mailer> {
        match self {
            MailerKind::Outbox => Arc::new(OutboxMailer::new(db.clone())),
            MailerKind::Log => Arc::new(LogMailer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::outbox_repository::OutboxRepository;
    use crate::test_support::setup_db;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            kind: NotificationKind::Published,
            to: to.into(),
            from: Some("noreply@sisme.fr".into()),
            subject: "Votre jeu est publié".into(),
            body: "Bonjour".into(),
            submission_id: Some("sub_abc".into()),
        }
    }

    #[tokio::test]
    async fn outbox_mailer_queues_messages_until_marked_sent() {
        let db = setup_db().await;
        let mailer = OutboxMailer::new(db.clone());

        mailer.send(&message("camille@atelier-lune.fr")).await.unwrap();

        let queued = OutboxRepository::find_unsent(&db, 10).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].kind, "published");
        assert_eq!(queued[0].submission_id.as_deref(), Some("sub_abc"));

        OutboxRepository::mark_sent(&db, queued[0].id).await.unwrap();
        assert!(OutboxRepository::find_unsent(&db, 10).await.unwrap().is_empty());
        assert_eq!(
            OutboxRepository::find_by_submission(&db, "sub_abc")
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn outbox_mailer_rejects_addresses_without_at_sign() {
        let db = setup_db().await;
        let err = OutboxMailer::new(db.clone())
            .send(&message("camille"))
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::InvalidRecipient(_)));
        assert!(OutboxRepository::find_unsent(&db, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn log_mailer_accepts_messages_without_touching_the_outbox() {
        let db = setup_db().await;
        let mailer = MailerKind::Log.build(&db);

        mailer.send(&message("camille@atelier-lune.fr")).await.unwrap();
        LogMailer.send(&message("camille")).await.unwrap();

        assert!(OutboxRepository::find_unsent(&db, 10).await.unwrap().is_empty());
    }

    #[test]
    fn mailer_kind_defaults_to_the_outbox() {
        assert_eq!(MailerKind::parse(None), MailerKind::Outbox);
        assert_eq!(MailerKind::parse(Some("")), MailerKind::Outbox);
        assert_eq!(MailerKind::parse(Some("smtp")), MailerKind::Outbox);
        assert_eq!(MailerKind::parse(Some(" LOG ")), MailerKind::Log);
    }
}
