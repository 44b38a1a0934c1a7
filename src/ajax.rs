//! 管理后台 AJAX 接口
//!
//! 每个请求依次检查：安全令牌 → 权限 → 参数，然后交给工作流执行。
//! 任何错误都在这里转换为 `{success:false,data:{message}}`，不会向调用方抛出。

use serde::Serialize;
use serde_json::{json, Value};

use crate::database::repository::users_repository::UsersRepository;
use crate::entity::game_data::GameData;
use crate::entity::submissions::SubmissionStatus;
use crate::review::error::{ReviewError, ReviewResult};
use crate::utils::logs::{get_log_level, set_log_level};
use crate::AppState;

/// 统一响应体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AjaxResponse {
    pub success: bool,
    pub data: Value,
}

impl AjaxResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn failure(error: &ReviewError) -> Self {
        Self {
            success: false,
            data: json!({
                "message": error.to_string(),
                "code": error.kind(),
            }),
        }
    }

    /// 失败时的提示消息
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

/// 支持的 AJAX 动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AjaxAction {
    // 管理员
    GetSubmissionDetails,
    ApproveSubmission,
    RejectSubmission,
    DeleteSubmission,
    ArchiveSubmission,
    ListSubmissions,
    GetSubmissionStats,
    ListDevelopers,
    SetLogLevel,
    GetLogLevel,
    // 开发者
    SaveSubmissionDraft,
    SubmitSubmission,
    CreateSubmissionRevision,
    ListMySubmissions,
}

impl AjaxAction {
    pub const ALL: [AjaxAction; 14] = [
        AjaxAction::GetSubmissionDetails,
        AjaxAction::ApproveSubmission,
        AjaxAction::RejectSubmission,
        AjaxAction::DeleteSubmission,
        AjaxAction::ArchiveSubmission,
        AjaxAction::ListSubmissions,
        AjaxAction::GetSubmissionStats,
        AjaxAction::ListDevelopers,
        AjaxAction::SetLogLevel,
        AjaxAction::GetLogLevel,
        AjaxAction::SaveSubmissionDraft,
        AjaxAction::SubmitSubmission,
        AjaxAction::CreateSubmissionRevision,
        AjaxAction::ListMySubmissions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AjaxAction::GetSubmissionDetails => "get_submission_details",
            AjaxAction::ApproveSubmission => "approve_submission",
            AjaxAction::RejectSubmission => "reject_submission",
            AjaxAction::DeleteSubmission => "delete_submission",
            AjaxAction::ArchiveSubmission => "archive_submission",
            AjaxAction::ListSubmissions => "list_submissions",
            AjaxAction::GetSubmissionStats => "get_submission_stats",
            AjaxAction::ListDevelopers => "list_developers",
            AjaxAction::SetLogLevel => "set_log_level",
            AjaxAction::GetLogLevel => "get_log_level",
            AjaxAction::SaveSubmissionDraft => "save_submission_draft",
            AjaxAction::SubmitSubmission => "submit_submission",
            AjaxAction::CreateSubmissionRevision => "create_submission_revision",
            AjaxAction::ListMySubmissions => "list_my_submissions",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// 是否需要管理员权限（其余动作要求已通过审核的开发者）
    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            AjaxAction::SaveSubmissionDraft
                | AjaxAction::SubmitSubmission
                | AjaxAction::CreateSubmissionRevision
                | AjaxAction::ListMySubmissions
        )
    }
}

/// 处理一次 AJAX 请求
pub async fn dispatch(state: &AppState, action: &str, actor_id: i32, payload: &Value) -> AjaxResponse {
    match handle(state, action, actor_id, payload).await {
        Ok(data) => AjaxResponse::success(data),
        Err(e) => {
            match &e {
                ReviewError::Storage(_) | ReviewError::ProjectionFailure(_) => {
                    log::error!("AJAX {} 失败 (用户 {}): {}", action, actor_id, e)
                }
                _ => log::warn!("AJAX {} 被拒绝 (用户 {}): {}", action, actor_id, e),
            }
            AjaxResponse::failure(&e)
        }
    }
}

async fn handle(state: &AppState, action: &str, actor_id: i32, payload: &Value) -> ReviewResult<Value> {
    // 1. 安全令牌
    let params = Params(payload);
    let token = params.str("security").unwrap_or_default();
    if !state.tokens.verify(token, action, actor_id) {
        return Err(ReviewError::SecurityTokenInvalid);
    }

    let action = AjaxAction::parse(action)
        .ok_or_else(|| ReviewError::invalid(format!("未知的操作: {}", action)))?;

    // 2. 权限
    let actor = UsersRepository::find_by_id(&state.db, actor_id)
        .await?
        .ok_or(ReviewError::PermissionDenied)?;
    let allowed = if action.requires_admin() {
        actor.is_admin()
    } else {
        actor.is_approved_developer()
    };
    if !allowed {
        return Err(ReviewError::PermissionDenied);
    }

    // 3. 参数与执行
    let workflow = &state.workflow;
    match action {
        AjaxAction::GetSubmissionDetails => {
            let (user_id, submission_id) = params.target()?;
            to_data(workflow.details(user_id, submission_id).await?)
        }
        AjaxAction::ApproveSubmission => {
            let (user_id, submission_id) = params.target()?;
            to_data(workflow.approve(actor.id, user_id, submission_id).await?)
        }
        AjaxAction::RejectSubmission => {
            let (user_id, submission_id) = params.target()?;
            let reason = params
                .non_empty("rejection_reason")
                .ok_or_else(|| ReviewError::invalid("退回原因不能为空"))?;
            to_data(workflow.reject(actor.id, user_id, submission_id, reason).await?)
        }
        AjaxAction::DeleteSubmission => {
            let (user_id, submission_id) = params.target()?;
            to_data(workflow.delete(actor.id, user_id, submission_id).await?)
        }
        AjaxAction::ArchiveSubmission => {
            let (user_id, submission_id) = params.target()?;
            let reason = params.non_empty("archive_reason");
            to_data(workflow.archive(actor.id, user_id, submission_id, reason).await?)
        }
        AjaxAction::ListSubmissions => {
            let status = params.status()?;
            to_data(workflow.list(status).await?)
        }
        AjaxAction::GetSubmissionStats => to_data(workflow.stats().await?),
        AjaxAction::ListDevelopers => to_data(workflow.approved_developers().await?),
        AjaxAction::SetLogLevel => {
            let level = params
                .non_empty("level")
                .ok_or_else(|| ReviewError::invalid("缺少日志级别"))?;
            let level = set_log_level(level).map_err(ReviewError::InvalidParameters)?;
            to_data(json!({ "level": level }))
        }
        AjaxAction::GetLogLevel => to_data(json!({ "level": get_log_level() })),
        AjaxAction::SaveSubmissionDraft => {
            let game_data = params.game_data()?;
            let saved = match params.non_empty("submission_id") {
                Some(submission_id) => {
                    workflow
                        .update_draft(actor.id, submission_id, game_data)
                        .await?
                }
                None => workflow.create_draft(actor.id, game_data).await?,
            };
            to_data(saved)
        }
        AjaxAction::SubmitSubmission => {
            let submission_id = params.submission_id()?;
            to_data(workflow.submit(actor.id, submission_id).await?)
        }
        AjaxAction::CreateSubmissionRevision => {
            let original_id = params.submission_id()?;
            let reason = params.non_empty("revision_reason");
            to_data(workflow.create_revision(actor.id, original_id, reason).await?)
        }
        AjaxAction::ListMySubmissions => {
            let include_archived = params.flag("include_archived");
            to_data(workflow.list_for_developer(actor.id, include_archived).await?)
        }
    }
}

fn to_data<T: Serialize>(value: T) -> ReviewResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ReviewError::invalid(format!("响应序列化失败: {}", e)))
}

/// 请求参数读取（表单提交的数字可能是字符串）
struct Params<'a>(&'a Value);

impl<'a> Params<'a> {
    fn str(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(Value::as_str)
    }

    fn non_empty(&self, key: &str) -> Option<&'a str> {
        self.str(key).map(str::trim).filter(|s| !s.is_empty())
    }

    fn int(&self, key: &str) -> Option<i32> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim(), "1" | "true"),
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    fn submission_id(&self) -> ReviewResult<&'a str> {
        self.non_empty("submission_id")
            .ok_or_else(|| ReviewError::invalid("缺少投稿 ID"))
    }

    /// 管理员操作的目标投稿：(user_id, submission_id)
    fn target(&self) -> ReviewResult<(i32, &'a str)> {
        let submission_id = self.submission_id()?;
        let user_id = self
            .int("user_id")
            .filter(|id| *id > 0)
            .ok_or_else(|| ReviewError::invalid("缺少用户 ID"))?;
        Ok((user_id, submission_id))
    }

    fn status(&self) -> ReviewResult<Option<SubmissionStatus>> {
        match self.non_empty("status") {
            None | Some("all") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(ReviewError::InvalidParameters),
        }
    }

    fn game_data(&self) -> ReviewResult<GameData> {
        let raw = self
            .0
            .get("game_data")
            .ok_or_else(|| ReviewError::invalid("缺少游戏数据"))?;
        serde_json::from_value(raw.clone())
            .map_err(|e| ReviewError::invalid(format!("游戏数据格式错误: {}", e)))
    }
}

#[cfg(test)]
mod tests;
