//! 投稿状态转换守卫
//!
//! 纯函数：根据当前状态和请求的动作给出目标状态或拒绝原因，不做任何写入。

use serde::{Deserialize, Serialize};

use crate::entity::submissions::SubmissionStatus;
use crate::review::error::{ReviewError, ReviewResult};

/// 审核相关动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    /// 开发者修改投稿内容
    Edit,
    /// 开发者提交审核
    Submit,
    Approve,
    Reject,
    Archive,
    Delete,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Edit => "edit",
            ReviewAction::Submit => "submit",
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::Archive => "archive",
            ReviewAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 守卫判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(SubmissionStatus),
    Removed,
}

/// 计算 `(current, action)` 的下一个状态
pub fn next_status(current: SubmissionStatus, action: ReviewAction) -> ReviewResult<Transition> {
    use SubmissionStatus::*;

    let next = match (action, current) {
        (ReviewAction::Edit, from) if from.is_editable() => Transition::To(current),
        (ReviewAction::Submit, from) if from.is_editable() => Transition::To(Pending),
        (ReviewAction::Approve, Pending) => Transition::To(Published),
        (ReviewAction::Reject, Pending | Published) => Transition::To(Draft),
        (ReviewAction::Archive, _) => Transition::To(Archived),
        (ReviewAction::Delete, _) => Transition::Removed,
        (action, from) => return Err(ReviewError::InvalidTransition { from, action }),
    };
    Ok(next)
}

/// 与 [`next_status`] 相同，但要求结果是一个具体状态
pub fn target_status(current: SubmissionStatus, action: ReviewAction) -> ReviewResult<SubmissionStatus> {
    match next_status(current, action)? {
        Transition::To(status) => Ok(status),
        Transition::Removed => Err(ReviewError::InvalidTransition {
            from: current,
            action,
        }),
    }
}
