//! 审核流程依赖的存储接口
//!
//! 工作流只通过这些 trait 访问数据，具体实例在启动时注入，
//! 测试中可替换为故障注入实现。

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use url::Url;

use crate::database::dto::{GameProjection, StatusUpdate};
use crate::database::repository::games_repository::GamesRepository;
use crate::database::repository::settings_repository::SettingsRepository;
use crate::database::repository::submissions_repository::SubmissionsRepository;
use crate::database::repository::users_repository::UsersRepository;
use crate::entity::game_data::{GameData, MediaId};
use crate::entity::submission_meta::SubmissionMeta;
use crate::entity::submissions::SubmissionStatus;
use crate::entity::{games, submissions, users};
use crate::review::error::ReviewResult;

/// 投稿存储
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create(
        &self,
        user_id: i32,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> ReviewResult<submissions::Model>;

    async fn get_submission_by_id(
        &self,
        user_id: i32,
        submission_id: &str,
    ) -> ReviewResult<Option<submissions::Model>>;

    async fn get_user_submissions(
        &self,
        user_id: i32,
        include_archived: bool,
    ) -> ReviewResult<Vec<submissions::Model>>;

    /// 主列表（默认排除已归档）
    async fn list_primary(
        &self,
        status: Option<SubmissionStatus>,
    ) -> ReviewResult<Vec<submissions::Model>>;

    async fn count_by_status(&self) -> ReviewResult<Vec<(SubmissionStatus, u64)>>;

    /// 仅在投稿可编辑时写入，返回是否写入
    async fn update_game_data(
        &self,
        user_id: i32,
        submission_id: &str,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> ReviewResult<bool>;

    /// 通用状态写入（比较并交换），返回是否写入
    async fn change_submission_status(&self, update: StatusUpdate) -> ReviewResult<bool>;

    /// 批准修订的专用写入，返回是否写入
    async fn approve_revision(
        &self,
        revision: StatusUpdate,
        original: &submissions::Model,
        game_data: GameData,
    ) -> ReviewResult<bool>;

    async fn delete_submission(&self, user_id: i32, submission_id: &str) -> ReviewResult<bool>;

    async fn find_open_revision(
        &self,
        user_id: i32,
        original_id: &str,
    ) -> ReviewResult<Option<submissions::Model>>;
}

/// 已发布游戏存储
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn create(&self, projection: GameProjection) -> ReviewResult<games::Model>;

    async fn update(&self, game_id: i32, projection: GameProjection) -> ReviewResult<games::Model>;

    /// 撤销刚创建的游戏，返回是否删除
    async fn delete(&self, game_id: i32) -> ReviewResult<bool>;

    async fn find(&self, game_id: i32) -> ReviewResult<Option<games::Model>>;

    /// 已发布游戏的公开地址，游戏不存在时返回 None
    async fn get_game_url(&self, game_id: i32) -> ReviewResult<Option<String>>;
}

/// 开发者信息提供者
#[async_trait]
pub trait DeveloperDirectory: Send + Sync {
    async fn find_user(&self, user_id: i32) -> ReviewResult<Option<users::Model>>;

    async fn approved_developers(&self) -> ReviewResult<Vec<users::Model>>;
}

/// 媒体文件存储
///
/// 删除是尽力而为：单个文件失败只记录日志，返回实际删除的数量
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn remove(&self, media: &[MediaId]) -> usize;
}

// ==================== 数据库实现 ====================

/// 基于 SeaORM 的投稿存储
#[derive(Clone)]
pub struct DbSubmissionStore {
    db: DatabaseConnection,
}

impl DbSubmissionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubmissionStore for DbSubmissionStore {
    async fn create(
        &self,
        user_id: i32,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> ReviewResult<submissions::Model> {
        Ok(SubmissionsRepository::insert(&self.db, user_id, game_data, metadata).await?)
    }

    async fn get_submission_by_id(
        &self,
        user_id: i32,
        submission_id: &str,
    ) -> ReviewResult<Option<submissions::Model>> {
        Ok(SubmissionsRepository::find_by_id(&self.db, user_id, submission_id).await?)
    }

    async fn get_user_submissions(
        &self,
        user_id: i32,
        include_archived: bool,
    ) -> ReviewResult<Vec<submissions::Model>> {
        Ok(SubmissionsRepository::find_by_user(&self.db, user_id, include_archived).await?)
    }

    async fn list_primary(
        &self,
        status: Option<SubmissionStatus>,
    ) -> ReviewResult<Vec<submissions::Model>> {
        Ok(SubmissionsRepository::find_primary(&self.db, status).await?)
    }

    async fn count_by_status(&self) -> ReviewResult<Vec<(SubmissionStatus, u64)>> {
        Ok(SubmissionsRepository::count_by_status(&self.db).await?)
    }

    async fn update_game_data(
        &self,
        user_id: i32,
        submission_id: &str,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> ReviewResult<bool> {
        Ok(SubmissionsRepository::update_game_data(
            &self.db,
            user_id,
            submission_id,
            game_data,
            metadata,
        )
        .await?)
    }

    async fn change_submission_status(&self, update: StatusUpdate) -> ReviewResult<bool> {
        Ok(SubmissionsRepository::update_review_state(&self.db, update).await?)
    }

    async fn approve_revision(
        &self,
        revision: StatusUpdate,
        original: &submissions::Model,
        game_data: GameData,
    ) -> ReviewResult<bool> {
        Ok(SubmissionsRepository::approve_revision(&self.db, revision, original, game_data).await?)
    }

    async fn delete_submission(&self, user_id: i32, submission_id: &str) -> ReviewResult<bool> {
        let result = SubmissionsRepository::delete(&self.db, user_id, submission_id).await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_open_revision(
        &self,
        user_id: i32,
        original_id: &str,
    ) -> ReviewResult<Option<submissions::Model>> {
        Ok(SubmissionsRepository::find_open_revision(&self.db, user_id, original_id).await?)
    }
}

/// 基于 SeaORM 的已发布游戏存储
#[derive(Clone)]
pub struct DbGameStore {
    db: DatabaseConnection,
}

impl DbGameStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GameStore for DbGameStore {
    async fn create(&self, projection: GameProjection) -> ReviewResult<games::Model> {
        Ok(GamesRepository::insert(&self.db, projection).await?)
    }

    async fn update(&self, game_id: i32, projection: GameProjection) -> ReviewResult<games::Model> {
        Ok(GamesRepository::update(&self.db, game_id, projection).await?)
    }

    async fn delete(&self, game_id: i32) -> ReviewResult<bool> {
        Ok(GamesRepository::delete(&self.db, game_id).await?)
    }

    async fn find(&self, game_id: i32) -> ReviewResult<Option<games::Model>> {
        Ok(GamesRepository::find_by_id(&self.db, game_id).await?)
    }

    async fn get_game_url(&self, game_id: i32) -> ReviewResult<Option<String>> {
        let Some(game) = GamesRepository::find_by_id(&self.db, game_id).await? else {
            return Ok(None);
        };
        let site_url = SettingsRepository::get_site_url(&self.db).await?;
        Ok(Some(build_game_url(&site_url, &game.slug)))
    }
}

/// 拼接游戏页面地址：`<site_url>/<slug>/`
///
/// 站点地址未配置或无法解析时返回相对路径
pub fn build_game_url(site_url: &str, slug: &str) -> String {
    let trimmed = site_url.trim();
    if trimmed.is_empty() {
        return format!("/{}/", slug);
    }

    let base = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    match Url::parse(&base).and_then(|url| url.join(&format!("{}/", slug))) {
        Ok(url) => url.to_string(),
        Err(e) => {
            log::warn!("站点地址无效 ({}): {}", trimmed, e);
            format!("/{}/", slug)
        }
    }
}

/// 基于 users 表的开发者信息提供者
#[derive(Clone)]
pub struct DbDeveloperDirectory {
    db: DatabaseConnection,
}

impl DbDeveloperDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeveloperDirectory for DbDeveloperDirectory {
    async fn find_user(&self, user_id: i32) -> ReviewResult<Option<users::Model>> {
        Ok(UsersRepository::find_by_id(&self.db, user_id).await?)
    }

    async fn approved_developers(&self) -> ReviewResult<Vec<users::Model>> {
        Ok(UsersRepository::find_approved_developers(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::build_game_url;

    #[test]
    fn game_url_joins_site_and_slug() {
        assert_eq!(
            build_game_url("https://games.sisme.fr", "hollow-path"),
            "https://games.sisme.fr/hollow-path/"
        );
        assert_eq!(
            build_game_url("https://games.sisme.fr/blog/", "hollow-path"),
            "https://games.sisme.fr/blog/hollow-path/"
        );
        assert_eq!(build_game_url("", "hollow-path"), "/hollow-path/");
    }
}
