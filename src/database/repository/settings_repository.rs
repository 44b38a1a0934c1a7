use crate::entity::prelude::*;
use crate::entity::settings;
use sea_orm::*;

/// 站点设置仓库
pub struct SettingsRepository;

impl SettingsRepository {
    /// 确保设置记录存在（ID 固定为 1）
    ///
    /// 首次创建时生成安全令牌密钥
    async fn ensure_settings_exist(db: &DatabaseConnection) -> Result<settings::Model, DbErr> {
        if let Some(existing) = Settings::find_by_id(1).one(db).await? {
            return Ok(existing);
        }

        let record = settings::ActiveModel {
            id: Set(1),
            site_name: Set(None),
            site_url: Set(None),
            notification_sender: Set(None),
            notifications_enabled: Set(1),
            token_secret: Set(Some(generate_secret())),
            media_path: Set(None),
        };

        record.insert(db).await
    }

    /// 获取所有设置
    pub async fn get_all_settings(db: &DatabaseConnection) -> Result<settings::Model, DbErr> {
        Self::ensure_settings_exist(db).await
    }

    /// 获取站点根地址
    pub async fn get_site_url(db: &DatabaseConnection) -> Result<String, DbErr> {
        let record = Self::ensure_settings_exist(db).await?;
        Ok(record.site_url.unwrap_or_default())
    }

    /// 获取安全令牌密钥（旧记录缺失时补齐）
    pub async fn get_token_secret(db: &DatabaseConnection) -> Result<String, DbErr> {
        let record = Self::ensure_settings_exist(db).await?;

        if let Some(secret) = record.token_secret.as_ref().filter(|s| !s.is_empty()) {
            return Ok(secret.clone());
        }

        let secret = generate_secret();
        let mut active: settings::ActiveModel = record.into();
        active.token_secret = Set(Some(secret.clone()));
        active.update(db).await?;
        Ok(secret)
    }

    /// 获取自定义媒体目录
    pub async fn get_media_path(db: &DatabaseConnection) -> Result<String, DbErr> {
        let record = Self::ensure_settings_exist(db).await?;
        Ok(record.media_path.unwrap_or_default())
    }

    /// 批量更新设置
    pub async fn update_settings(
        db: &DatabaseConnection,
        site_name: Option<String>,
        site_url: Option<String>,
        notification_sender: Option<String>,
        notifications_enabled: Option<bool>,
        media_path: Option<String>,
    ) -> Result<settings::Model, DbErr> {
        let record = Self::ensure_settings_exist(db).await?;
        let mut active: settings::ActiveModel = record.into();

        if let Some(name) = site_name {
            active.site_name = Set(Some(name));
        }

        if let Some(url) = site_url {
            active.site_url = Set(Some(url));
        }

        if let Some(sender) = notification_sender {
            active.notification_sender = Set(Some(sender));
        }

        if let Some(enabled) = notifications_enabled {
            active.notifications_enabled = Set(enabled as i32);
        }

        if let Some(path) = media_path {
            active.media_path = Set(Some(path));
        }

        active.update(db).await
    }
}

fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}
