//! 投稿审核工作流
//!
//! 每个写操作都在对应投稿的锁内完成：读取 → 守卫判定 → 写入 → 通知。
//! 通知在写入成功之后发送，失败不会回滚任何状态。

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::database::dto::{StatusUpdate, SubmissionStats};
use crate::entity::game_data::{GameData, MediaId};
use crate::entity::submission_meta::{AdminData, SubmissionMeta};
use crate::entity::submissions::{self, SubmissionStatus};
use crate::entity::users;
use crate::notify::mailer::Mailer;
use crate::notify::templates::NotificationKind;
use crate::notify::{NotificationDetails, Notifier, NotifierSettings};
use crate::review::error::{ReviewError, ReviewResult};
use crate::review::guard::{next_status, target_status, ReviewAction, Transition};
use crate::review::locks::SubmissionLocks;
use crate::review::projector::Projector;
use crate::review::store::{DeveloperDirectory, GameStore, MediaStore, SubmissionStore};
use crate::review::validation::{validate_draft, validate_for_submission};

/// 归档未填写原因时使用的默认值
pub const DEFAULT_ARCHIVE_REASON: &str = "no reason given";

/// 构建工作流所需的全部依赖
pub struct WorkflowParts {
    pub submissions: Arc<dyn SubmissionStore>,
    pub games: Arc<dyn GameStore>,
    pub developers: Arc<dyn DeveloperDirectory>,
    pub media: Arc<dyn MediaStore>,
    pub mailer: Arc<dyn Mailer>,
    pub notifier: NotifierSettings,
}

// ==================== 返回结构 ====================

#[derive(Debug, Clone, Serialize)]
pub struct DeveloperSummary {
    pub id: i32,
    pub display_name: String,
    pub email: String,
}

impl From<&users::Model> for DeveloperSummary {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// 列表中的投稿摘要
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub id: String,
    pub user_id: i32,
    pub status: SubmissionStatus,
    pub game_name: String,
    pub is_revision: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_published_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<i64>,
    pub updated_at: i64,
}

impl From<&submissions::Model> for SubmissionSummary {
    fn from(s: &submissions::Model) -> Self {
        Self {
            id: s.id.clone(),
            user_id: s.user_id,
            status: s.status,
            game_name: s.game_data.name.clone(),
            is_revision: s.metadata.is_revision,
            original_published_id: s.metadata.original_published_id.clone(),
            submitted_at: s.metadata.submitted_at,
            updated_at: s.updated_at,
        }
    }
}

/// 审核详情
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetails {
    pub submission: submissions::Model,
    pub developer: Option<DeveloperSummary>,
    /// 对应已发布游戏的地址（修订取原始投稿的游戏）
    pub game_url: Option<String>,
    /// 修订指向的原始投稿
    pub original: Option<SubmissionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub submission_id: String,
    pub status: SubmissionStatus,
    pub game_id: i32,
    pub game_slug: String,
    pub game_url: Option<String>,
    pub is_revision: bool,
    pub notified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectionOutcome {
    pub submission_id: String,
    pub status: SubmissionStatus,
    pub reason: String,
    pub notified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub submission_id: String,
    pub status: SubmissionStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletionOutcome {
    pub submission_id: String,
    pub media_removed: usize,
}

// ==================== 工作流 ====================

pub struct ReviewWorkflow {
    submissions: Arc<dyn SubmissionStore>,
    games: Arc<dyn GameStore>,
    developers: Arc<dyn DeveloperDirectory>,
    media: Arc<dyn MediaStore>,
    projector: Projector,
    notifier: Notifier,
    locks: SubmissionLocks,
}

impl ReviewWorkflow {
    pub fn new(parts: WorkflowParts) -> Self {
        let projector = Projector::new(parts.submissions.clone(), parts.games.clone());
        let notifier = Notifier::new(parts.mailer, parts.developers.clone(), parts.notifier);

        Self {
            submissions: parts.submissions,
            games: parts.games,
            developers: parts.developers,
            media: parts.media,
            projector,
            notifier,
            locks: SubmissionLocks::new(),
        }
    }

    // ==================== 管理员：查询 ====================

    /// 审核详情：投稿本身、开发者、已发布游戏地址
    pub async fn details(&self, user_id: i32, submission_id: &str) -> ReviewResult<SubmissionDetails> {
        let submission = self.load(user_id, submission_id).await?;

        let developer = self
            .developers
            .find_user(submission.user_id)
            .await?
            .as_ref()
            .map(DeveloperSummary::from);

        let original = if submission.metadata.is_revision {
            match submission.metadata.original_published_id.as_deref() {
                Some(original_id) => self
                    .submissions
                    .get_submission_by_id(user_id, original_id)
                    .await?,
                None => None,
            }
        } else {
            None
        };

        let game_id = original
            .as_ref()
            .and_then(|o| o.metadata.published_game_id)
            .or(submission.metadata.published_game_id);
        let game_url = match game_id {
            Some(id) => self.games.get_game_url(id).await?,
            None => None,
        };

        Ok(SubmissionDetails {
            original: original.as_ref().map(SubmissionSummary::from),
            submission,
            developer,
            game_url,
        })
    }

    /// 主列表（不含已归档，除非显式按 archived 筛选）
    pub async fn list(&self, status: Option<SubmissionStatus>) -> ReviewResult<Vec<SubmissionSummary>> {
        let rows = self.submissions.list_primary(status).await?;
        Ok(rows.iter().map(SubmissionSummary::from).collect())
    }

    /// 某个开发者自己的投稿
    pub async fn list_for_developer(
        &self,
        user_id: i32,
        include_archived: bool,
    ) -> ReviewResult<Vec<SubmissionSummary>> {
        let rows = self
            .submissions
            .get_user_submissions(user_id, include_archived)
            .await?;
        Ok(rows.iter().map(SubmissionSummary::from).collect())
    }

    pub async fn stats(&self) -> ReviewResult<SubmissionStats> {
        let counts = self.submissions.count_by_status().await?;
        Ok(SubmissionStats::from_counts(&counts))
    }

    pub async fn approved_developers(&self) -> ReviewResult<Vec<DeveloperSummary>> {
        let users = self.developers.approved_developers().await?;
        Ok(users.iter().map(DeveloperSummary::from).collect())
    }

    // ==================== 管理员：审核 ====================

    /// 批准投稿并发布（或把修订应用到已发布游戏）
    pub async fn approve(
        &self,
        reviewer_id: i32,
        user_id: i32,
        submission_id: &str,
    ) -> ReviewResult<ApprovalOutcome> {
        let scope = self.approval_scope(user_id, submission_id).await?;
        let _guards = self.locks.acquire_all(&scope).await;

        let submission = self.load(user_id, submission_id).await?;
        target_status(submission.status, ReviewAction::Approve)?;

        let publication = self.projector.approve(&submission, reviewer_id).await?;

        let game_url = match self.games.get_game_url(publication.game.id).await {
            Ok(url) => url,
            Err(e) => {
                log::warn!("获取游戏 {} 地址失败: {}", publication.game.id, e);
                None
            }
        };

        let kind = if publication.is_revision {
            NotificationKind::RevisionApproved
        } else {
            NotificationKind::Published
        };
        let notified = self
            .notifier
            .notify(
                kind,
                &submission,
                NotificationDetails {
                    game_url: game_url.clone(),
                    reason: None,
                },
            )
            .await;

        log::info!(
            "管理员 {} 批准了投稿 {} (游戏 {})",
            reviewer_id,
            submission_id,
            publication.game.id
        );

        Ok(ApprovalOutcome {
            submission_id: publication.submission_id,
            status: SubmissionStatus::Published,
            game_id: publication.game.id,
            game_slug: publication.game.slug,
            game_url,
            is_revision: publication.is_revision,
            notified,
        })
    }

    /// 退回投稿为草稿，原因必填
    ///
    /// 已发布投稿被退回时，已发布游戏保持不变
    pub async fn reject(
        &self,
        reviewer_id: i32,
        user_id: i32,
        submission_id: &str,
        reason: &str,
    ) -> ReviewResult<RejectionOutcome> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ReviewError::invalid("退回原因不能为空"));
        }

        let _guard = self.locks.acquire(submission_id).await;

        let submission = self.load(user_id, submission_id).await?;
        let to = target_status(submission.status, ReviewAction::Reject)?;

        let now = chrono::Utc::now().timestamp();
        let applied = self
            .submissions
            .change_submission_status(StatusUpdate {
                user_id,
                submission_id: submission.id.clone(),
                from: submission.status,
                to,
                metadata: SubmissionMeta {
                    updated_at: now,
                    rejected_at: Some(now),
                    rejection_reason: Some(reason.to_string()),
                    ..submission.metadata.clone()
                },
                admin_data: reviewed(&submission.admin_data, reviewer_id, ReviewAction::Reject, now),
            })
            .await?;
        if !applied {
            return Err(self.stale(&submission, ReviewAction::Reject).await);
        }

        let notified = self
            .notifier
            .notify(
                NotificationKind::Rejected,
                &submission,
                NotificationDetails {
                    game_url: None,
                    reason: Some(reason.to_string()),
                },
            )
            .await;

        log::info!("管理员 {} 退回了投稿 {}", reviewer_id, submission_id);
        Ok(RejectionOutcome {
            submission_id: submission.id,
            status: to,
            reason: reason.to_string(),
            notified,
        })
    }

    /// 归档投稿：移出主列表，保留记录
    pub async fn archive(
        &self,
        reviewer_id: i32,
        user_id: i32,
        submission_id: &str,
        reason: Option<&str>,
    ) -> ReviewResult<ArchiveOutcome> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ARCHIVE_REASON)
            .to_string();

        let _guard = self.locks.acquire(submission_id).await;

        let submission = self.load(user_id, submission_id).await?;
        let to = target_status(submission.status, ReviewAction::Archive)?;

        let now = chrono::Utc::now().timestamp();
        let applied = self
            .submissions
            .change_submission_status(StatusUpdate {
                user_id,
                submission_id: submission.id.clone(),
                from: submission.status,
                to,
                metadata: SubmissionMeta {
                    updated_at: now,
                    archived_at: Some(now),
                    archive_reason: Some(reason.clone()),
                    ..submission.metadata.clone()
                },
                admin_data: reviewed(&submission.admin_data, reviewer_id, ReviewAction::Archive, now),
            })
            .await?;
        if !applied {
            return Err(self.stale(&submission, ReviewAction::Archive).await);
        }

        log::info!("管理员 {} 归档了投稿 {}: {}", reviewer_id, submission_id, reason);
        Ok(ArchiveOutcome {
            submission_id: submission.id,
            status: to,
            reason,
        })
    }

    /// 删除投稿并清理不再被使用的媒体文件
    pub async fn delete(
        &self,
        actor_id: i32,
        user_id: i32,
        submission_id: &str,
    ) -> ReviewResult<DeletionOutcome> {
        let _guard = self.locks.acquire(submission_id).await;

        let submission = self.load(user_id, submission_id).await?;
        if next_status(submission.status, ReviewAction::Delete)? != Transition::Removed {
            return Err(ReviewError::InvalidTransition {
                from: submission.status,
                action: ReviewAction::Delete,
            });
        }

        // 先算出可删除的媒体，删除记录后就无法再追溯原始投稿
        let orphaned = self.orphaned_media(&submission).await;

        if !self.submissions.delete_submission(user_id, submission_id).await? {
            return Err(ReviewError::submission_not_found(user_id, submission_id));
        }

        let media_removed = if orphaned.is_empty() {
            0
        } else {
            self.media.remove(&orphaned).await
        };

        log::info!(
            "用户 {} 删除了投稿 {}，清理媒体 {} 个",
            actor_id,
            submission_id,
            media_removed
        );
        Ok(DeletionOutcome {
            submission_id: submission.id,
            media_removed,
        })
    }

    /// 删除时可以安全移除的媒体
    ///
    /// - 从未发布的普通投稿：全部
    /// - 关联已发布游戏的投稿（含修订）：游戏未引用的部分
    /// - 关联关系无法解析：不删除
    async fn orphaned_media(&self, submission: &submissions::Model) -> Vec<MediaId> {
        let media = submission.game_data.media();
        if media.is_empty() {
            return media;
        }

        let live_game_id = if submission.metadata.is_revision {
            match self.original_game_id(submission).await {
                Some(id) => id,
                None => {
                    log::warn!("修订 {} 的原始游戏无法解析，保留全部媒体", submission.id);
                    return Vec::new();
                }
            }
        } else {
            match submission.metadata.published_game_id {
                Some(id) => id,
                None => return media,
            }
        };

        let live: HashSet<MediaId> = match self.games.find(live_game_id).await {
            Ok(Some(game)) => game.term_meta.media().into_iter().collect(),
            Ok(None) => {
                log::warn!("游戏 {} 不存在，保留投稿 {} 的媒体", live_game_id, submission.id);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("读取游戏 {} 失败，保留媒体: {}", live_game_id, e);
                return Vec::new();
            }
        };

        media.into_iter().filter(|m| !live.contains(m)).collect()
    }

    async fn original_game_id(&self, revision: &submissions::Model) -> Option<i32> {
        let original_id = revision.metadata.original_published_id.as_deref()?;
        match self
            .submissions
            .get_submission_by_id(revision.user_id, original_id)
            .await
        {
            Ok(original) => original?.metadata.published_game_id,
            Err(e) => {
                log::warn!("读取原始投稿 {} 失败: {}", original_id, e);
                None
            }
        }
    }

    // ==================== 开发者操作 ====================

    /// 新建草稿
    pub async fn create_draft(
        &self,
        user_id: i32,
        game_data: GameData,
    ) -> ReviewResult<submissions::Model> {
        validate_draft(&game_data)?;
        let created = self
            .submissions
            .create(user_id, game_data, SubmissionMeta::default())
            .await?;
        log::info!("用户 {} 新建投稿 {}", user_id, created.id);
        Ok(created)
    }

    /// 保存草稿内容（仅草稿 / 旧版 rejected 可编辑）
    pub async fn update_draft(
        &self,
        user_id: i32,
        submission_id: &str,
        game_data: GameData,
    ) -> ReviewResult<submissions::Model> {
        validate_draft(&game_data)?;

        let _guard = self.locks.acquire(submission_id).await;

        let submission = self.load(user_id, submission_id).await?;
        target_status(submission.status, ReviewAction::Edit)?;

        let metadata = SubmissionMeta {
            updated_at: chrono::Utc::now().timestamp(),
            ..submission.metadata.clone()
        };
        if !self
            .submissions
            .update_game_data(user_id, submission_id, game_data, metadata)
            .await?
        {
            return Err(self.stale(&submission, ReviewAction::Edit).await);
        }

        self.load(user_id, submission_id).await
    }

    /// 提交审核
    pub async fn submit(&self, user_id: i32, submission_id: &str) -> ReviewResult<submissions::Model> {
        let _guard = self.locks.acquire(submission_id).await;

        let submission = self.load(user_id, submission_id).await?;
        let to = target_status(submission.status, ReviewAction::Submit)?;
        validate_for_submission(&submission.game_data)?;

        let now = chrono::Utc::now().timestamp();
        let applied = self
            .submissions
            .change_submission_status(StatusUpdate {
                user_id,
                submission_id: submission.id.clone(),
                from: submission.status,
                to,
                metadata: SubmissionMeta {
                    updated_at: now,
                    submitted_at: Some(now),
                    ..submission.metadata.clone()
                },
                admin_data: submission.admin_data.clone(),
            })
            .await?;
        if !applied {
            return Err(self.stale(&submission, ReviewAction::Submit).await);
        }

        log::info!("用户 {} 提交了投稿 {}", user_id, submission_id);
        self.load(user_id, submission_id).await
    }

    /// 为已发布投稿创建修订草稿，内容复制自原始投稿
    pub async fn create_revision(
        &self,
        user_id: i32,
        original_id: &str,
        reason: Option<&str>,
    ) -> ReviewResult<submissions::Model> {
        let _guard = self.locks.acquire(original_id).await;

        let original = self.load(user_id, original_id).await?;
        if original.status != SubmissionStatus::Published {
            return Err(ReviewError::invalid("只能修订已发布的投稿"));
        }
        if original.metadata.is_revision {
            return Err(ReviewError::invalid("不能对修订再创建修订"));
        }
        if original.metadata.published_game_id.is_none() {
            return Err(ReviewError::BrokenReference(format!(
                "投稿 {} 没有对应的已发布游戏",
                original.id
            )));
        }
        if let Some(open) = self
            .submissions
            .find_open_revision(user_id, original_id)
            .await?
        {
            return Err(ReviewError::invalid(format!(
                "投稿 {} 已有进行中的修订 {}",
                original_id, open.id
            )));
        }

        let metadata = SubmissionMeta {
            is_revision: true,
            original_published_id: Some(original.id.clone()),
            revision_reason: reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            ..SubmissionMeta::default()
        };

        let revision = self
            .submissions
            .create(user_id, original.game_data.clone(), metadata)
            .await?;
        log::info!("用户 {} 为投稿 {} 创建修订 {}", user_id, original_id, revision.id);
        Ok(revision)
    }

    // ==================== 内部工具 ====================

    async fn load(&self, user_id: i32, submission_id: &str) -> ReviewResult<submissions::Model> {
        self.submissions
            .get_submission_by_id(user_id, submission_id)
            .await?
            .ok_or_else(|| ReviewError::submission_not_found(user_id, submission_id))
    }

    /// 批准时需要锁住的投稿：修订还要锁住其原始投稿
    ///
    /// 修订指向的原始投稿 ID 创建后不再变化，可以在加锁前读取
    async fn approval_scope(&self, user_id: i32, submission_id: &str) -> ReviewResult<Vec<String>> {
        let mut scope = vec![submission_id.to_string()];
        let original = self
            .submissions
            .get_submission_by_id(user_id, submission_id)
            .await?
            .filter(|s| s.metadata.is_revision)
            .and_then(|s| s.metadata.original_published_id)
            .filter(|id| !id.is_empty());
        scope.extend(original);
        Ok(scope)
    }

    /// 状态写入未生效：按最新状态报告
    async fn stale(&self, submission: &submissions::Model, action: ReviewAction) -> ReviewError {
        match self.load(submission.user_id, &submission.id).await {
            Ok(current) => ReviewError::InvalidTransition {
                from: current.status,
                action,
            },
            Err(e) => e,
        }
    }
}

fn reviewed(admin: &AdminData, reviewer_id: i32, action: ReviewAction, now: i64) -> AdminData {
    AdminData {
        reviewed_by: Some(reviewer_id),
        reviewed_at: Some(now),
        last_action: Some(action.to_string()),
        ..admin.clone()
    }
}
