//! 投稿数据仓库
//!
//! 投稿按 (user_id, id) 定位；状态写入均为带前置状态的比较并交换。

use crate::database::dto::StatusUpdate;
use crate::entity::game_data::GameData;
use crate::entity::prelude::*;
use crate::entity::submission_meta::{AdminData, SubmissionMeta};
use crate::entity::submissions;
use sea_orm::sea_query::Expr;
use sea_orm::*;

/// 投稿数据仓库
pub struct SubmissionsRepository;

impl SubmissionsRepository {
    // ==================== 写入操作 ====================

    /// 新建投稿（初始状态为草稿）
    pub async fn insert(
        db: &DatabaseConnection,
        user_id: i32,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> Result<submissions::Model, DbErr> {
        let now = chrono::Utc::now().timestamp();
        let id = format!("sub_{}", uuid::Uuid::new_v4().simple());

        let submission = submissions::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            status: Set(SubmissionStatus::Draft),
            game_data: Set(game_data),
            metadata: Set(SubmissionMeta {
                created_at: now,
                updated_at: now,
                ..metadata
            }),
            admin_data: Set(AdminData::default()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        submission.insert(db).await
    }

    /// 更新投稿内容，仅草稿（含旧版 rejected）可编辑
    ///
    /// 返回是否真正写入
    pub async fn update_game_data(
        db: &DatabaseConnection,
        user_id: i32,
        submission_id: &str,
        game_data: GameData,
        metadata: SubmissionMeta,
    ) -> Result<bool, DbErr> {
        let now = chrono::Utc::now().timestamp();

        let result = Submissions::update_many()
            .col_expr(submissions::Column::GameData, Expr::value(game_data))
            .col_expr(submissions::Column::Metadata, Expr::value(metadata))
            .col_expr(submissions::Column::UpdatedAt, Expr::value(now))
            .filter(submissions::Column::Id.eq(submission_id))
            .filter(submissions::Column::UserId.eq(user_id))
            .filter(
                submissions::Column::Status
                    .is_in(SubmissionStatus::iter().filter(|s| s.is_editable())),
            )
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// 比较并交换投稿状态，同时写入元数据和审核数据
    pub async fn update_review_state<C>(db: &C, update: StatusUpdate) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();

        let result = Submissions::update_many()
            .col_expr(submissions::Column::Status, Expr::value(update.to))
            .col_expr(submissions::Column::Metadata, Expr::value(update.metadata))
            .col_expr(submissions::Column::AdminData, Expr::value(update.admin_data))
            .col_expr(submissions::Column::UpdatedAt, Expr::value(now))
            .filter(submissions::Column::Id.eq(update.submission_id))
            .filter(submissions::Column::UserId.eq(update.user_id))
            .filter(submissions::Column::Status.eq(update.from))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// 批准修订投稿
    ///
    /// 在同一事务中：
    /// 1. 修订投稿 pending → published，记录游戏 ID 与审核数据
    /// 2. 原始投稿接收修订后的游戏数据，并记录最近一次修订 ID
    ///
    /// 原始投稿的元数据在事务内重新读取，只改动修订相关字段
    pub async fn approve_revision(
        db: &DatabaseConnection,
        revision: StatusUpdate,
        original: &submissions::Model,
        game_data: GameData,
    ) -> Result<bool, DbErr> {
        let txn = db.begin().await?;
        let now = chrono::Utc::now().timestamp();
        let revision_id = revision.submission_id.clone();

        if !Self::update_review_state(&txn, revision).await? {
            txn.rollback().await?;
            return Ok(false);
        }

        let Some(current) = Submissions::find_by_id(original.id.clone())
            .filter(submissions::Column::UserId.eq(original.user_id))
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Err(DbErr::RecordNotFound(format!(
                "Submission {} not found",
                original.id
            )));
        };

        let original_meta = SubmissionMeta {
            updated_at: now,
            last_revision_id: Some(revision_id),
            ..current.metadata
        };

        Submissions::update_many()
            .col_expr(submissions::Column::GameData, Expr::value(game_data))
            .col_expr(submissions::Column::Metadata, Expr::value(original_meta))
            .col_expr(submissions::Column::UpdatedAt, Expr::value(now))
            .filter(submissions::Column::Id.eq(original.id.as_str()))
            .filter(submissions::Column::UserId.eq(original.user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(true)
    }

    /// 删除投稿
    pub async fn delete(
        db: &DatabaseConnection,
        user_id: i32,
        submission_id: &str,
    ) -> Result<DeleteResult, DbErr> {
        Submissions::delete_many()
            .filter(submissions::Column::Id.eq(submission_id))
            .filter(submissions::Column::UserId.eq(user_id))
            .exec(db)
            .await
    }

    // ==================== 查询操作 ====================

    /// 根据 (user_id, id) 查询投稿
    pub async fn find_by_id(
        db: &DatabaseConnection,
        user_id: i32,
        submission_id: &str,
    ) -> Result<Option<submissions::Model>, DbErr> {
        Submissions::find_by_id(submission_id.to_string())
            .filter(submissions::Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    /// 获取某个开发者的投稿（按更新时间倒序）
    pub async fn find_by_user(
        db: &DatabaseConnection,
        user_id: i32,
        include_archived: bool,
    ) -> Result<Vec<submissions::Model>, DbErr> {
        let mut query = Submissions::find().filter(submissions::Column::UserId.eq(user_id));
        if !include_archived {
            query = query.filter(submissions::Column::Status.ne(SubmissionStatus::Archived));
        }
        query
            .order_by_desc(submissions::Column::UpdatedAt)
            .order_by_asc(submissions::Column::Id)
            .all(db)
            .await
    }

    /// 管理后台主列表
    ///
    /// 未指定状态时排除已归档投稿；显式请求 archived 时返回归档列表
    pub async fn find_primary(
        db: &DatabaseConnection,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<submissions::Model>, DbErr> {
        let query = match status {
            Some(status) => Submissions::find().filter(submissions::Column::Status.eq(status)),
            None => Submissions::find()
                .filter(submissions::Column::Status.ne(SubmissionStatus::Archived)),
        };
        query
            .order_by_desc(submissions::Column::UpdatedAt)
            .order_by_asc(submissions::Column::Id)
            .all(db)
            .await
    }

    /// 统计各状态的投稿数量
    pub async fn count_by_status(
        db: &DatabaseConnection,
    ) -> Result<Vec<(SubmissionStatus, u64)>, DbErr> {
        let mut counts = Vec::new();
        for status in SubmissionStatus::iter() {
            let count = Submissions::find()
                .filter(submissions::Column::Status.eq(status))
                .count(db)
                .await?;
            counts.push((status, count));
        }
        Ok(counts)
    }

    /// 查找某个已发布投稿仍在进行中的修订（草稿或待审核）
    ///
    /// original_published_id 在 JSON 列中，无法直接用于筛选，在应用层过滤
    pub async fn find_open_revision(
        db: &DatabaseConnection,
        user_id: i32,
        original_id: &str,
    ) -> Result<Option<submissions::Model>, DbErr> {
        let candidates = Submissions::find()
            .filter(submissions::Column::UserId.eq(user_id))
            .filter(submissions::Column::Status.is_in([
                SubmissionStatus::Draft,
                SubmissionStatus::Pending,
                SubmissionStatus::Rejected,
            ]))
            .all(db)
            .await?;

        Ok(candidates.into_iter().find(|s| {
            s.metadata.is_revision
                && s.metadata.original_published_id.as_deref() == Some(original_id)
        }))
    }
}
