pub mod ajax;
pub mod database;
pub mod entity;
pub mod notify;
pub mod review;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use database::connection::{close_connection, establish_connection};
use database::repository::settings_repository::SettingsRepository;
use notify::mailer::MailerKind;
use notify::NotifierSettings;
use review::store::{DbDeveloperDirectory, DbGameStore, DbSubmissionStore};
use review::workflow::{ReviewWorkflow, WorkflowParts};
use utils::media::FsMediaStore;
use utils::security::SecurityTokens;

/// 运行期共享状态，由宿主在处理请求时传入 [`ajax::dispatch`]
pub struct AppState {
    pub db: DatabaseConnection,
    pub workflow: Arc<ReviewWorkflow>,
    pub tokens: SecurityTokens,
}

impl AppState {
    /// 为页面渲染签发某个动作的安全令牌
    pub fn security_token(&self, action: &str, actor_id: i32) -> String {
        self.tokens.create(action, actor_id)
    }
}

/// 按默认数据目录启动
pub async fn init() -> Result<AppState, String> {
    let db_path = sisme_path::get_db_path()?;
    let db = establish_connection(&db_path)
        .await
        .map_err(|e| format!("无法建立数据库连接: {}", e))?;
    log::info!("数据库连接建立成功");

    let media_root = match SettingsRepository::get_media_path(&db).await {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
        Ok(_) => sisme_path::get_default_media_path()?,
        Err(e) => {
            // 设置表在首次启动时还不存在，迁移完成后才能读取
            log::debug!("读取媒体目录设置失败，使用默认目录: {}", e);
            sisme_path::get_default_media_path()?
        }
    };

    init_with_connection(db, media_root).await
}

/// 使用已建立的连接启动：执行迁移并装配工作流
pub async fn init_with_connection(
    db: DatabaseConnection,
    media_root: PathBuf,
) -> Result<AppState, String> {
    log::info!("开始执行数据库迁移...");
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| format!("数据库迁移失败: {}", e))?;
    log::info!("数据库迁移完成");

    let settings = SettingsRepository::get_all_settings(&db)
        .await
        .map_err(|e| format!("读取站点设置失败: {}", e))?;
    let secret = SettingsRepository::get_token_secret(&db)
        .await
        .map_err(|e| format!("读取令牌密钥失败: {}", e))?;

    log::info!("媒体目录: {}", media_root.display());

    let mailer = MailerKind::from_env();
    log::info!("邮件实现: {:?}", mailer);

    let workflow = ReviewWorkflow::new(WorkflowParts {
        submissions: Arc::new(DbSubmissionStore::new(db.clone())),
        games: Arc::new(DbGameStore::new(db.clone())),
        developers: Arc::new(DbDeveloperDirectory::new(db.clone())),
        media: Arc::new(FsMediaStore::new(media_root)),
        mailer: mailer.build(&db),
        notifier: NotifierSettings {
            enabled: settings.notifications_enabled != 0,
            site_name: settings.site_name.clone().unwrap_or_default(),
            sender: settings.notification_sender.clone(),
        },
    });

    Ok(AppState {
        db,
        workflow: Arc::new(workflow),
        tokens: SecurityTokens::new(secret),
    })
}

/// 关闭数据库连接
pub async fn shutdown(state: AppState) {
    match close_connection(state.db).await {
        Ok(_) => log::info!("数据库连接已成功关闭"),
        Err(e) => log::error!("关闭数据库连接时出错: {}", e),
    }
}
