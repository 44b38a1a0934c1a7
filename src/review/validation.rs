//! 投稿游戏数据校验
//!
//! 保存草稿时只校验结构合法性；提交审核时额外要求内容完整。

use url::Url;

use crate::entity::game_data::{GameData, MediaId};
use crate::review::error::{ReviewError, ReviewResult};
use crate::utils::media::is_plain_file_name;

pub const NAME_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 20;

/// 草稿级校验
pub fn validate_draft(data: &GameData) -> ReviewResult<()> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(ReviewError::invalid("游戏名称不能为空"));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(ReviewError::invalid(format!(
            "游戏名称不能超过 {} 个字符",
            NAME_MAX_CHARS
        )));
    }

    if let Some(trailer) = &data.trailer_url {
        check_url("预告片链接", trailer)?;
    }
    for studio in [&data.studio, &data.publisher].into_iter().flatten() {
        if let Some(url) = &studio.url {
            check_url("工作室链接", url)?;
        }
    }
    for link in &data.external_links {
        if link.platform.trim().is_empty() {
            return Err(ReviewError::invalid("外部链接缺少平台名称"));
        }
        check_url("外部链接", &link.url)?;
    }

    for media in data.media() {
        check_media(&media)?;
    }

    for section in &data.sections {
        if section.title.trim().is_empty() && section.content.trim().is_empty() {
            return Err(ReviewError::invalid("存在空白的段落"));
        }
    }

    Ok(())
}

/// 提交审核前的完整性校验
pub fn validate_for_submission(data: &GameData) -> ReviewResult<()> {
    validate_draft(data)?;

    if data.description.trim().chars().count() < DESCRIPTION_MIN_CHARS {
        return Err(ReviewError::invalid(format!(
            "游戏简介至少需要 {} 个字符",
            DESCRIPTION_MIN_CHARS
        )));
    }
    if data.covers.horizontal.is_none() {
        return Err(ReviewError::invalid("缺少横版封面"));
    }
    if data.genres.iter().all(|g| g.trim().is_empty()) {
        return Err(ReviewError::invalid("至少需要选择一个游戏类型"));
    }

    Ok(())
}

fn check_url(field: &str, raw: &str) -> ReviewResult<()> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ReviewError::invalid(format!("{}无效: {}", field, raw))),
    }
}

fn check_media(media: &MediaId) -> ReviewResult<()> {
    if is_plain_file_name(media) {
        Ok(())
    } else {
        Err(ReviewError::invalid(format!(
            "媒体文件名无效: {}",
            media.as_str()
        )))
    }
}
