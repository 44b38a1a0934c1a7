//! 测试共用的夹具：内存数据库、种子用户、可记录 / 可注入故障的依赖实现

use std::sync::Arc;

use async_trait::async_trait;
use migration::MigratorTrait;
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;

use crate::database::connection::connect_in_memory;
use crate::database::dto::{GameProjection, StatusUpdate};
use crate::database::repository::games_repository::GamesRepository;
use crate::database::repository::settings_repository::SettingsRepository;
use crate::database::repository::users_repository::UsersRepository;
use crate::entity::game_data::{Covers, ExternalLink, GameData, GameSection, MediaId, StudioInfo};
use crate::entity::submission_meta::SubmissionMeta;
use crate::entity::prelude::*;
use crate::entity::{games, submissions, users};
use crate::notify::mailer::{EmailMessage, MailError, Mailer};
use crate::notify::NotifierSettings;
use crate::review::error::{ReviewError, ReviewResult};
use crate::review::store::{
    DbDeveloperDirectory, DbGameStore, DbSubmissionStore, GameStore, MediaStore, SubmissionStore,
};
use crate::review::workflow::{ReviewWorkflow, WorkflowParts};

pub const SITE_URL: &str = "https://games.sisme.fr";
pub const SITE_NAME: &str = "Sisme Games";

/// 已迁移的内存数据库
pub async fn setup_db() -> DatabaseConnection {
    let db = connect_in_memory().await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    SettingsRepository::update_settings(
        &db,
        Some(SITE_NAME.to_string()),
        Some(SITE_URL.to_string()),
        Some("noreply@sisme.fr".to_string()),
        Some(true),
        None,
    )
    .await
    .unwrap();
    db
}

/// 内容完整、可以直接提交审核的游戏数据
pub fn complete_game_data(name: &str) -> GameData {
    let stem = crate::utils::slug::slugify(name);
    GameData {
        name: name.to_string(),
        description: format!("{} est un jeu d'exploration en pixel art.", name),
        studio: Some(StudioInfo {
            name: "Atelier Lune".into(),
            url: Some("https://atelier-lune.fr".into()),
        }),
        covers: Covers {
            horizontal: Some(MediaId::new(format!("{stem}-h.webp"))),
            vertical: Some(MediaId::new(format!("{stem}-v.webp"))),
        },
        screenshots: vec![MediaId::new(format!("{stem}-shot1.webp"))],
        sections: vec![GameSection {
            title: "Histoire".into(),
            content: "Une cartographe perdue.".into(),
            image: None,
        }],
        external_links: vec![ExternalLink {
            platform: "steam".into(),
            url: "https://store.steampowered.com/app/1".into(),
        }],
        genres: vec!["aventure".into()],
        platforms: vec!["pc".into()],
        ..Default::default()
    }
}

// ==================== 可注入的依赖 ====================

/// 记录所有发出的邮件
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().push(message.clone());
        Ok(())
    }
}

/// 总是投递失败
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
        Err(MailError::Transport("smtp unreachable".into()))
    }
}

/// 写入游戏总是失败，读取走数据库
pub struct FailingGameStore {
    inner: DbGameStore,
}

impl FailingGameStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            inner: DbGameStore::new(db),
        }
    }
}

#[async_trait]
impl GameStore for FailingGameStore {
    async fn create(&self, _projection: GameProjection) -> ReviewResult<games::Model> {
        Err(ReviewError::ProjectionFailure("term insert rejected".into()))
    }

    async fn update(&self, _game_id: i32, _projection: GameProjection) -> ReviewResult<games::Model> {
        Err(ReviewError::ProjectionFailure("term update rejected".into()))
    }

    async fn delete(&self, game_id: i32) -> ReviewResult<bool> {
        self.inner.delete(game_id).await
    }

    async fn find(&self, game_id: i32) -> ReviewResult<Option<games::Model>> {
        self.inner.find(game_id).await
    }

    async fn get_game_url(&self, game_id: i32) -> ReviewResult<Option<String>> {
        self.inner.get_game_url(game_id).await
    }
}

/// 发布后回写游戏 ID（published → published）总是失败，其余写入走数据库
pub struct FailingWriteBackStore {
    inner: DbSubmissionStore,
}

impl FailingWriteBackStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            inner: DbSubmissionStore::new(db),
        }
    }
}

#[async_trait]
impl SubmissionStore for FailingWriteBackStore {
    async fn create(
        &self,
        user_id: i32,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> ReviewResult<submissions::Model> {
        self.inner.create(user_id, game_data, metadata).await
    }

    async fn get_submission_by_id(
        &self,
        user_id: i32,
        submission_id: &str,
    ) -> ReviewResult<Option<submissions::Model>> {
        self.inner.get_submission_by_id(user_id, submission_id).await
    }

    async fn get_user_submissions(
        &self,
        user_id: i32,
        include_archived: bool,
    ) -> ReviewResult<Vec<submissions::Model>> {
        self.inner.get_user_submissions(user_id, include_archived).await
    }

    async fn list_primary(
        &self,
        status: Option<SubmissionStatus>,
    ) -> ReviewResult<Vec<submissions::Model>> {
        self.inner.list_primary(status).await
    }

    async fn count_by_status(&self) -> ReviewResult<Vec<(SubmissionStatus, u64)>> {
        self.inner.count_by_status().await
    }

    async fn update_game_data(
        &self,
        user_id: i32,
        submission_id: &str,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> ReviewResult<bool> {
        self.inner
            .update_game_data(user_id, submission_id, game_data, metadata)
            .await
    }

    async fn change_submission_status(&self, update: StatusUpdate) -> ReviewResult<bool> {
        if update.from == SubmissionStatus::Published && update.to == SubmissionStatus::Published {
            return Err(ReviewError::Storage(sea_orm::DbErr::Custom(
                "database is locked".into(),
            )));
        }
        self.inner.change_submission_status(update).await
    }

    async fn approve_revision(
        &self,
        revision: StatusUpdate,
        original: &submissions::Model,
        game_data: GameData,
    ) -> ReviewResult<bool> {
        self.inner.approve_revision(revision, original, game_data).await
    }

    async fn delete_submission(&self, user_id: i32, submission_id: &str) -> ReviewResult<bool> {
        self.inner.delete_submission(user_id, submission_id).await
    }

    async fn find_open_revision(
        &self,
        user_id: i32,
        original_id: &str,
    ) -> ReviewResult<Option<submissions::Model>> {
        self.inner.find_open_revision(user_id, original_id).await
    }
}

/// 只记录删除请求，不碰文件系统
#[derive(Default)]
pub struct RecordingMediaStore {
    removed: Mutex<Vec<MediaId>>,
}

impl RecordingMediaStore {
    pub fn removed(&self) -> Vec<MediaId> {
        self.removed.lock().clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn remove(&self, media: &[MediaId]) -> usize {
        self.removed.lock().extend_from_slice(media);
        media.len()
    }
}

// ==================== 工作流夹具 ====================

pub struct Fixture {
    pub db: DatabaseConnection,
    pub admin: users::Model,
    pub developer: users::Model,
    pub mailer: Arc<RecordingMailer>,
    pub media: Arc<RecordingMediaStore>,
    pub workflow: Arc<ReviewWorkflow>,
}

#[derive(Default)]
pub struct FixtureOptions {
    /// 使用写入总失败的游戏存储
    pub failing_games: bool,
    /// 使用回写游戏 ID 总失败的投稿存储
    pub failing_write_back: bool,
    pub mailer: Option<Arc<dyn Mailer>>,
}

pub async fn fixture() -> Fixture {
    fixture_with(FixtureOptions::default()).await
}

pub async fn fixture_with(options: FixtureOptions) -> Fixture {
    let db = setup_db().await;

    let admin = UsersRepository::insert(
        &db,
        "Admin",
        "admin@sisme.fr",
        UserRole::Admin,
        DeveloperStatus::None,
    )
    .await
    .unwrap();
    let developer = UsersRepository::insert(
        &db,
        "Camille",
        "camille@atelier-lune.fr",
        UserRole::Developer,
        DeveloperStatus::Approved,
    )
    .await
    .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let media = Arc::new(RecordingMediaStore::default());

    let workflow = ReviewWorkflow::new(WorkflowParts {
        submissions: if options.failing_write_back {
            Arc::new(FailingWriteBackStore::new(db.clone())) as Arc<dyn SubmissionStore>
        } else {
            Arc::new(DbSubmissionStore::new(db.clone()))
        },
        games: if options.failing_games {
            Arc::new(FailingGameStore::new(db.clone())) as Arc<dyn GameStore>
        } else {
            Arc::new(DbGameStore::new(db.clone()))
        },
        developers: Arc::new(DbDeveloperDirectory::new(db.clone())),
        media: media.clone(),
        mailer: options
            .mailer
            .unwrap_or_else(|| mailer.clone() as Arc<dyn Mailer>),
        notifier: NotifierSettings {
            enabled: true,
            site_name: SITE_NAME.to_string(),
            sender: Some("noreply@sisme.fr".to_string()),
        },
    });

    Fixture {
        db,
        admin,
        developer,
        mailer,
        media,
        workflow: Arc::new(workflow),
    }
}

impl Fixture {
    pub async fn draft(&self, name: &str) -> submissions::Model {
        self.workflow
            .create_draft(self.developer.id, complete_game_data(name))
            .await
            .unwrap()
    }

    pub async fn pending(&self, name: &str) -> submissions::Model {
        let draft = self.draft(name).await;
        self.workflow
            .submit(self.developer.id, &draft.id)
            .await
            .unwrap()
    }

    pub async fn published(&self, name: &str) -> submissions::Model {
        let pending = self.pending(name).await;
        self.workflow
            .approve(self.admin.id, self.developer.id, &pending.id)
            .await
            .unwrap();
        self.reload(&pending.id).await
    }

    pub async fn reload(&self, submission_id: &str) -> submissions::Model {
        crate::database::repository::submissions_repository::SubmissionsRepository::find_by_id(
            &self.db,
            self.developer.id,
            submission_id,
        )
        .await
        .unwrap()
        .expect("submission should exist")
    }

    pub async fn game_count(&self) -> u64 {
        GamesRepository::count(&self.db).await.unwrap()
    }
}
