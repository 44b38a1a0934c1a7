//! 已发布游戏数据仓库
//!
//! games 表只由投影器写入：首次批准时创建，批准修订时原地更新。

use crate::database::dto::GameProjection;
use crate::entity::games;
use crate::entity::prelude::*;
use sea_orm::*;

/// 已发布游戏数据仓库
pub struct GamesRepository;

impl GamesRepository {
    // ==================== 游戏 CRUD 操作 ====================

    /// 创建已发布游戏
    ///
    /// slug 必须唯一，重名游戏会因唯一约束插入失败
    pub async fn insert(
        db: &DatabaseConnection,
        projection: GameProjection,
    ) -> Result<games::Model, DbErr> {
        let now = chrono::Utc::now().timestamp();

        let game_active = games::ActiveModel {
            id: NotSet,
            name: Set(projection.name),
            slug: Set(projection.slug),
            description: Set(projection.description),
            developer_user_id: Set(projection.developer_user_id),
            source_submission_id: Set(projection.source_submission_id),
            term_meta: Set(projection.term_meta),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        game_active.insert(db).await
    }

    /// 更新已发布游戏
    ///
    /// slug 保持不变，避免已发布页面的链接失效
    pub async fn update(
        db: &DatabaseConnection,
        game_id: i32,
        projection: GameProjection,
    ) -> Result<games::Model, DbErr> {
        let existing = Games::find_by_id(game_id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Game {} not found", game_id)))?;

        let mut active: games::ActiveModel = existing.into();
        active.name = Set(projection.name);
        active.description = Set(projection.description);
        active.term_meta = Set(projection.term_meta);
        active.updated_at = Set(Some(chrono::Utc::now().timestamp()));

        active.update(db).await
    }

    /// 删除游戏，返回是否删除
    pub async fn delete(db: &DatabaseConnection, game_id: i32) -> Result<bool, DbErr> {
        let result = Games::delete_by_id(game_id).exec(db).await?;
        Ok(result.rows_affected > 0)
    }

    // ==================== 查询操作 ====================

    /// 根据 ID 查询游戏
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<games::Model>, DbErr> {
        Games::find_by_id(id).one(db).await
    }

    /// 获取游戏总数
    pub async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        Games::find().count(db).await
    }
}
