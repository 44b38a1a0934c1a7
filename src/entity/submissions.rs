//! 投稿实体
//!
//! 每条投稿归属一个开发者（user_id），通过 (user_id, id) 定位。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::game_data::GameData;
use super::submission_meta::{AdminData, SubmissionMeta};

/// 投稿状态
///
/// `Rejected` 仅出现在旧数据中，驳回操作本身会把投稿退回 `Draft`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "draft",
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Published => "published",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Archived => "archived",
        }
    }

    /// 开发者是否还能编辑投稿内容
    pub fn is_editable(&self) -> bool {
        matches!(self, SubmissionStatus::Draft | SubmissionStatus::Rejected)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(SubmissionStatus::Draft),
            "pending" => Ok(SubmissionStatus::Pending),
            "published" => Ok(SubmissionStatus::Published),
            "rejected" => Ok(SubmissionStatus::Rejected),
            "archived" => Ok(SubmissionStatus::Archived),
            other => Err(format!("未知的投稿状态: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: i32,
    pub status: SubmissionStatus,

    // === JSON 数据列 ===
    #[sea_orm(column_type = "Text")]
    pub game_data: GameData,
    #[sea_orm(column_type = "Text")]
    pub metadata: SubmissionMeta,
    #[sea_orm(column_type = "Text")]
    pub admin_data: AdminData,

    // === 时间戳 ===
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn only_drafts_and_legacy_rejections_are_editable() {
        let editable: Vec<_> = SubmissionStatus::iter().filter(|s| s.is_editable()).collect();
        assert_eq!(editable, vec![SubmissionStatus::Draft, SubmissionStatus::Rejected]);
    }

    #[test]
    fn status_parses_only_the_closed_set() {
        for status in SubmissionStatus::iter() {
            assert_eq!(status.as_str().parse::<SubmissionStatus>(), Ok(status));
        }
        assert!("approved".parse::<SubmissionStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
