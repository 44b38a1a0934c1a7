//! 数据传输对象 (DTO)
//!
//! 仓库层与工作流之间传递的结构定义。

use serde::{Deserialize, Serialize};

use crate::entity::games::GameTermMeta;
use crate::entity::submission_meta::{AdminData, SubmissionMeta};
use crate::entity::submissions::SubmissionStatus;

/// 带状态前置条件的投稿更新
///
/// 仅当数据库中的状态仍为 `from` 时才写入（比较并交换），
/// 并发的第二次审核会因此失败而不是覆盖第一次的结果。
#[derive(Clone, Debug)]
pub struct StatusUpdate {
    pub user_id: i32,
    pub submission_id: String,
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
    pub metadata: SubmissionMeta,
    pub admin_data: AdminData,
}

/// 写入 games 表的数据（由投影器从投稿数据生成）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameProjection {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub developer_user_id: Option<i32>,
    pub source_submission_id: Option<String>,
    pub term_meta: GameTermMeta,
}

/// 各状态的投稿数量
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStats {
    pub draft: u64,
    pub pending: u64,
    pub published: u64,
    pub rejected: u64,
    pub archived: u64,
    /// 主列表中的总数（不含已归档）
    pub total: u64,
}

impl SubmissionStats {
    pub fn from_counts(counts: &[(SubmissionStatus, u64)]) -> Self {
        let mut stats = SubmissionStats::default();
        for (status, count) in counts {
            match status {
                SubmissionStatus::Draft => stats.draft = *count,
                SubmissionStatus::Pending => stats.pending = *count,
                SubmissionStatus::Published => stats.published = *count,
                SubmissionStatus::Rejected => stats.rejected = *count,
                SubmissionStatus::Archived => stats.archived = *count,
            }
        }
        stats.total = stats.draft + stats.pending + stats.published + stats.rejected;
        stats
    }
}
