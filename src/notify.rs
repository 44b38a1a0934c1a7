//! 审核结果通知
//!
//! 尽力而为：发送失败只记录日志，不影响已经完成的状态变更和投影。

pub mod mailer;
pub mod templates;

use std::sync::Arc;

use crate::entity::submissions;
use crate::review::store::DeveloperDirectory;
use mailer::{EmailMessage, Mailer};
use templates::{NotificationKind, TemplateContext, render};

/// 通知相关的站点配置
#[derive(Debug, Clone)]
pub struct NotifierSettings {
    pub enabled: bool,
    pub site_name: String,
    pub sender: Option<String>,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            site_name: String::new(),
            sender: None,
        }
    }
}

/// 一次通知的附加信息
#[derive(Debug, Clone, Default)]
pub struct NotificationDetails {
    pub game_url: Option<String>,
    pub reason: Option<String>,
}

pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    developers: Arc<dyn DeveloperDirectory>,
    settings: NotifierSettings,
}

impl Notifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        developers: Arc<dyn DeveloperDirectory>,
        settings: NotifierSettings,
    ) -> Self {
        Self {
            mailer,
            developers,
            settings,
        }
    }

    /// 通知投稿所属开发者，返回邮件是否已交给发送服务
    pub async fn notify(
        &self,
        kind: NotificationKind,
        submission: &submissions::Model,
        details: NotificationDetails,
    ) -> bool {
        if !self.settings.enabled {
            log::debug!("通知已关闭，跳过 {} ({})", kind.as_str(), submission.id);
            return false;
        }

        let developer = match self.developers.find_user(submission.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                log::warn!(
                    "投稿 {} 的开发者 {} 不存在，跳过通知",
                    submission.id,
                    submission.user_id
                );
                return false;
            }
            Err(e) => {
                log::warn!("读取开发者 {} 失败，跳过通知: {}", submission.user_id, e);
                return false;
            }
        };

        let rendered = render(
            kind,
            &TemplateContext {
                developer_name: developer.display_name.clone(),
                game_name: submission.game_data.name.trim().to_string(),
                site_name: self.settings.site_name.clone(),
                game_url: details.game_url,
                reason: details.reason,
            },
        );

        let message = EmailMessage {
            kind,
            to: developer.email.clone(),
            from: self.settings.sender.clone(),
            subject: rendered.subject,
            body: rendered.body,
            submission_id: Some(submission.id.clone()),
        };

        match self.mailer.send(&message).await {
            Ok(()) => {
                log::info!("已通知开发者 {} ({})", developer.id, kind.as_str());
                true
            }
            Err(e) => {
                log::warn!(
                    "通知开发者 {} 失败 ({}, {}): {}",
                    developer.id,
                    kind.as_str(),
                    submission.id,
                    e
                );
                false
            }
        }
    }
}
