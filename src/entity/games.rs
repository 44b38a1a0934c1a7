//! 已发布游戏实体
//!
//! 相当于站点上的游戏分类条目（term）：名称、唯一 slug、简介，
//! 其余展示字段以 JSON 列 term_meta 存储。

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use super::game_data::{Covers, ExternalLink, GameSection, MediaId, StudioInfo};

/// 已发布游戏的展示元数据（JSON 列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(default)]
pub struct GameTermMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<StudioInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<StudioInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    pub covers: Covers,
    pub screenshots: Vec<MediaId>,
    pub sections: Vec<GameSection>,
    pub external_links: Vec<ExternalLink>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
}

impl GameTermMeta {
    /// 已发布游戏正在使用的全部媒体文件
    pub fn media(&self) -> Vec<MediaId> {
        self.covers
            .horizontal
            .iter()
            .chain(self.covers.vertical.iter())
            .chain(self.screenshots.iter())
            .chain(self.sections.iter().filter_map(|s| s.image.as_ref()))
            .cloned()
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub developer_user_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub source_submission_id: Option<String>,

    // === JSON 元数据列 ===
    #[sea_orm(column_type = "Text")]
    pub term_meta: GameTermMeta,

    // === 时间戳 ===
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
