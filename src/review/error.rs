//! 审核流程统一错误类型
//!
//! 所有仓库 / 投影器 / 工作流调用都返回 `Result<T, ReviewError>`，
//! 在 AJAX 边界统一转换为失败响应，消息原样展示给管理员。

use sea_orm::DbErr;
use serde::Serialize;

use crate::entity::submissions::SubmissionStatus;
use crate::review::guard::ReviewAction;

pub type ReviewResult<T> = Result<T, ReviewError>;

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("权限不足")]
    PermissionDenied,

    #[error("安全校验失败，请刷新页面后重试")]
    SecurityTokenInvalid,

    #[error("参数无效: {0}")]
    InvalidParameters(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("当前状态 {from} 不允许执行 {action}")]
    InvalidTransition {
        from: SubmissionStatus,
        action: ReviewAction,
    },

    #[error("发布游戏失败: {0}")]
    ProjectionFailure(String),

    #[error("修订引用无效: {0}")]
    BrokenReference(String),

    #[error("数据库错误: {0}")]
    Storage(#[from] DbErr),
}

/// 错误分类，用于响应体中的 `code` 字段和测试断言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    SecurityTokenInvalid,
    InvalidParameters,
    NotFound,
    InvalidTransition,
    ProjectionFailure,
    BrokenReference,
    Storage,
}

impl ReviewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReviewError::PermissionDenied => ErrorKind::PermissionDenied,
            ReviewError::SecurityTokenInvalid => ErrorKind::SecurityTokenInvalid,
            ReviewError::InvalidParameters(_) => ErrorKind::InvalidParameters,
            ReviewError::NotFound(_) => ErrorKind::NotFound,
            ReviewError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            ReviewError::ProjectionFailure(_) => ErrorKind::ProjectionFailure,
            ReviewError::BrokenReference(_) => ErrorKind::BrokenReference,
            ReviewError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ReviewError::InvalidParameters(msg.into())
    }

    pub(crate) fn submission_not_found(user_id: i32, submission_id: &str) -> Self {
        ReviewError::NotFound(format!("投稿 {} (用户 {})", submission_id, user_id))
    }
}
