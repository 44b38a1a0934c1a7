//! 投稿元数据与管理员数据 JSON 结构体
//!
//! 存储在 submissions.metadata / submissions.admin_data 列中。

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// 投稿生命周期元数据（时间戳均为 Unix 秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(default)]
pub struct SubmissionMeta {
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_reason: Option<String>,

    // === 修订关联 ===
    /// 是否为对已发布游戏的修订投稿
    pub is_revision: bool,
    /// 修订所指向的原始（已发布）投稿 ID，弱引用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_published_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_reason: Option<String>,
    /// 原始投稿上记录最近一次被批准的修订
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_revision_id: Option<String>,

    /// 审核通过后对应的已发布游戏 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_game_id: Option<i32>,
}

/// 管理员审核数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(default)]
pub struct AdminData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<i64>,
    /// 最近一次审核动作（approve / reject / archive）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}
