//! 发布投影器
//!
//! 把审核通过的投稿数据转换为已发布游戏条目并写入：
//! - 新游戏：先把状态切换为 published 再创建游戏，创建或回写失败时撤销游戏并回滚为 pending
//! - 修订：更新原始投稿对应的游戏，成功后才把修订标记为已批准

use std::sync::Arc;

use crate::database::dto::{GameProjection, StatusUpdate};
use crate::entity::game_data::GameData;
use crate::entity::games::{self, GameTermMeta};
use crate::entity::submission_meta::{AdminData, SubmissionMeta};
use crate::entity::submissions::{self, SubmissionStatus};
use crate::review::error::{ReviewError, ReviewResult};
use crate::review::guard::{ReviewAction, target_status};
use crate::review::store::{GameStore, SubmissionStore};
use crate::utils::slug::slugify;

/// 把投稿数据映射为 games 表需要的结构
pub fn extract(submission: &submissions::Model) -> GameProjection {
    let data = &submission.game_data;

    let source_submission_id = if submission.metadata.is_revision {
        submission.metadata.original_published_id.clone()
    } else {
        Some(submission.id.clone())
    };

    GameProjection {
        name: data.name.trim().to_string(),
        slug: game_slug(data, &submission.id),
        description: data.description.trim().to_string(),
        developer_user_id: Some(submission.user_id),
        source_submission_id,
        term_meta: term_meta(data),
    }
}

fn game_slug(data: &GameData, submission_id: &str) -> String {
    let slug = slugify(&data.name);
    if slug.is_empty() {
        // 名称里没有任何可用字符时退回投稿 ID
        format!("game-{}", submission_id.trim_start_matches("sub_"))
    } else {
        slug
    }
}

fn term_meta(data: &GameData) -> GameTermMeta {
    GameTermMeta {
        studio: data.studio.clone(),
        publisher: data.publisher.clone(),
        release_date: data.release_date.clone(),
        trailer_url: data.trailer_url.clone(),
        covers: data.covers.clone(),
        screenshots: data.screenshots.clone(),
        sections: data.sections.clone(),
        external_links: data.external_links.clone(),
        genres: data
            .genres
            .iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect(),
        platforms: data.platforms.clone(),
    }
}

/// 投影结果
#[derive(Debug, Clone)]
pub struct Publication {
    pub game: games::Model,
    pub submission_id: String,
    pub is_revision: bool,
}

pub struct Projector {
    submissions: Arc<dyn SubmissionStore>,
    games: Arc<dyn GameStore>,
}

impl Projector {
    pub fn new(submissions: Arc<dyn SubmissionStore>, games: Arc<dyn GameStore>) -> Self {
        Self { submissions, games }
    }

    /// 批准投稿：按是否为修订分派
    pub async fn approve(
        &self,
        submission: &submissions::Model,
        reviewer_id: i32,
    ) -> ReviewResult<Publication> {
        target_status(submission.status, ReviewAction::Approve)?;

        if submission.metadata.is_revision {
            self.approve_revision(submission, reviewer_id).await
        } else {
            self.approve_new(submission, reviewer_id).await
        }
    }

    /// 首次发布
    async fn approve_new(
        &self,
        submission: &submissions::Model,
        reviewer_id: i32,
    ) -> ReviewResult<Publication> {
        let now = chrono::Utc::now().timestamp();
        let review = AdminData {
            reviewed_by: Some(reviewer_id),
            reviewed_at: Some(now),
            last_action: Some(ReviewAction::Approve.to_string()),
            ..submission.admin_data.clone()
        };

        // 曾发布后被退回的投稿会原地更新游戏，先留存旧内容以便撤销
        let previous = match submission.metadata.published_game_id {
            Some(game_id) => self.games.find(game_id).await?,
            None => None,
        };

        // 1. pending → published，占用该投稿
        let published = self
            .submissions
            .change_submission_status(StatusUpdate {
                user_id: submission.user_id,
                submission_id: submission.id.clone(),
                from: SubmissionStatus::Pending,
                to: SubmissionStatus::Published,
                metadata: SubmissionMeta {
                    updated_at: now,
                    ..submission.metadata.clone()
                },
                admin_data: review.clone(),
            })
            .await?;
        if !published {
            return Err(self.stale_transition(submission).await);
        }

        // 2. 创建或更新已发布游戏，失败时回滚状态
        let projected = match submission.metadata.published_game_id {
            Some(game_id) => self.games.update(game_id, extract(submission)).await,
            None => self.games.create(extract(submission)).await,
        };
        let game = match projected {
            Ok(game) => game,
            Err(e) => {
                log::error!("创建已发布游戏失败 ({}): {}", submission.id, e);
                self.rollback_to_pending(submission).await;
                return Err(as_projection_failure(e));
            }
        };

        // 3. 一次写入状态、游戏 ID 与批准时间；失败时撤销游戏并回滚状态
        let metadata = SubmissionMeta {
            updated_at: now,
            approved_at: Some(now),
            published_game_id: Some(game.id),
            ..submission.metadata.clone()
        };
        let recorded = self
            .submissions
            .change_submission_status(StatusUpdate {
                user_id: submission.user_id,
                submission_id: submission.id.clone(),
                from: SubmissionStatus::Published,
                to: SubmissionStatus::Published,
                metadata,
                admin_data: review,
            })
            .await;
        let write_back_error = match recorded {
            Ok(true) => None,
            Ok(false) => Some(ReviewError::ProjectionFailure(format!(
                "投稿 {} 的状态已被修改，无法记录游戏 {}",
                submission.id, game.id
            ))),
            Err(e) => Some(e),
        };
        if let Some(e) = write_back_error {
            log::error!("回写投稿 {} 的游戏 ID {} 失败: {}", submission.id, game.id, e);
            self.discard_projection(&game, previous).await;
            self.rollback_to_pending(submission).await;
            return Err(e);
        }

        log::info!("投稿 {} 已发布为游戏 {} ({})", submission.id, game.id, game.slug);
        Ok(Publication {
            game,
            submission_id: submission.id.clone(),
            is_revision: false,
        })
    }

    /// 批准修订：更新已发布游戏，不新建
    async fn approve_revision(
        &self,
        revision: &submissions::Model,
        reviewer_id: i32,
    ) -> ReviewResult<Publication> {
        let original_id = revision
            .metadata
            .original_published_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ReviewError::BrokenReference(format!("修订 {} 缺少原始投稿 ID", revision.id))
            })?;

        let original = self
            .submissions
            .get_submission_by_id(revision.user_id, original_id)
            .await?
            .ok_or_else(|| {
                ReviewError::BrokenReference(format!(
                    "修订 {} 指向的原始投稿 {} 不存在",
                    revision.id, original_id
                ))
            })?;

        let game_id = original.metadata.published_game_id.ok_or_else(|| {
            ReviewError::BrokenReference(format!(
                "原始投稿 {} 没有对应的已发布游戏",
                original.id
            ))
        })?;

        // 1. 先更新游戏，失败则修订保持 pending
        let game = self
            .games
            .update(game_id, extract(revision))
            .await
            .map_err(|e| {
                log::error!("更新已发布游戏 {} 失败 ({}): {}", game_id, revision.id, e);
                as_projection_failure(e)
            })?;

        // 2. 标记修订已批准
        let now = chrono::Utc::now().timestamp();
        let update = StatusUpdate {
            user_id: revision.user_id,
            submission_id: revision.id.clone(),
            from: SubmissionStatus::Pending,
            to: SubmissionStatus::Published,
            metadata: SubmissionMeta {
                updated_at: now,
                approved_at: Some(now),
                published_game_id: Some(game_id),
                ..revision.metadata.clone()
            },
            admin_data: AdminData {
                reviewed_by: Some(reviewer_id),
                reviewed_at: Some(now),
                last_action: Some(ReviewAction::Approve.to_string()),
                ..revision.admin_data.clone()
            },
        };

        if !self
            .submissions
            .approve_revision(update, &original, revision.game_data.clone())
            .await?
        {
            log::error!("游戏 {} 已更新，但修订 {} 状态已被修改", game_id, revision.id);
            return Err(self.stale_transition(revision).await);
        }

        log::info!("修订 {} 已应用到游戏 {}", revision.id, game_id);
        Ok(Publication {
            game,
            submission_id: revision.id.clone(),
            is_revision: true,
        })
    }

    /// 补偿操作：删除新建的游戏，或把原地更新的游戏恢复为旧内容
    async fn discard_projection(&self, game: &games::Model, previous: Option<games::Model>) {
        let undone = match previous {
            Some(previous) => self
                .games
                .update(previous.id, projection_of(&previous))
                .await
                .map(|_| true),
            None => self.games.delete(game.id).await,
        };

        match undone {
            Ok(true) => log::warn!("游戏 {} 的本次发布已撤销", game.id),
            Ok(false) => log::error!("撤销游戏 {} 失败: 游戏已不存在", game.id),
            Err(e) => log::error!("撤销游戏 {} 失败: {}", game.id, e),
        }
    }

    /// 补偿操作：published → pending，恢复原有元数据
    async fn rollback_to_pending(&self, submission: &submissions::Model) {
        let restored = self
            .submissions
            .change_submission_status(StatusUpdate {
                user_id: submission.user_id,
                submission_id: submission.id.clone(),
                from: SubmissionStatus::Published,
                to: SubmissionStatus::Pending,
                metadata: submission.metadata.clone(),
                admin_data: submission.admin_data.clone(),
            })
            .await;

        match restored {
            Ok(true) => log::warn!("投稿 {} 已回滚为 pending", submission.id),
            Ok(false) => log::error!("回滚投稿 {} 失败: 状态已被修改", submission.id),
            Err(e) => log::error!("回滚投稿 {} 失败: {}", submission.id, e),
        }
    }

    /// 比较并交换失败时，按数据库中的最新状态报告
    async fn stale_transition(&self, submission: &submissions::Model) -> ReviewError {
        let current = self
            .submissions
            .get_submission_by_id(submission.user_id, &submission.id)
            .await
            .ok()
            .flatten()
            .map(|s| s.status);

        match current {
            Some(from) => ReviewError::InvalidTransition {
                from,
                action: ReviewAction::Approve,
            },
            None => ReviewError::submission_not_found(submission.user_id, &submission.id),
        }
    }
}

/// 已发布游戏的当前内容，用于撤销原地更新
fn projection_of(game: &games::Model) -> GameProjection {
    GameProjection {
        name: game.name.clone(),
        slug: game.slug.clone(),
        description: game.description.clone(),
        developer_user_id: game.developer_user_id,
        source_submission_id: game.source_submission_id.clone(),
        term_meta: game.term_meta.clone(),
    }
}

fn as_projection_failure(e: ReviewError) -> ReviewError {
    match e {
        ReviewError::ProjectionFailure(_) => e,
        other => ReviewError::ProjectionFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::game_data::{Covers, MediaId};

    fn submission(is_revision: bool) -> submissions::Model {
        submissions::Model {
            id: "sub_abc".into(),
            user_id: 4,
            status: SubmissionStatus::Pending,
            game_data: GameData {
                name: "  Hollow Path ".into(),
                description: "Lost cartographers.".into(),
                covers: Covers {
                    horizontal: Some(MediaId::new("h.webp")),
                    vertical: None,
                },
                genres: vec!["metroidvania".into(), " ".into()],
                ..Default::default()
            },
            metadata: SubmissionMeta {
                is_revision,
                original_published_id: is_revision.then(|| "sub_original".to_string()),
                ..Default::default()
            },
            admin_data: AdminData::default(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn extract_maps_submission_fields_onto_the_game_shape() {
        let projection = extract(&submission(false));
        assert_eq!(projection.name, "Hollow Path");
        assert_eq!(projection.slug, "hollow-path");
        assert_eq!(projection.developer_user_id, Some(4));
        assert_eq!(projection.source_submission_id.as_deref(), Some("sub_abc"));
        assert_eq!(projection.term_meta.genres, vec!["metroidvania"]);
        assert_eq!(
            projection.term_meta.covers.horizontal,
            Some(MediaId::new("h.webp"))
        );
    }

    #[test]
    fn revision_projection_points_at_the_original_submission() {
        let projection = extract(&submission(true));
        assert_eq!(
            projection.source_submission_id.as_deref(),
            Some("sub_original")
        );
    }

    #[test]
    fn unsluggable_names_fall_back_to_the_submission_id() {
        let mut s = submission(false);
        s.game_data.name = "!!!".into();
        assert_eq!(extract(&s).slug, "game-abc");
    }
}
