//! 投稿游戏数据 JSON 结构体
//!
//! 存储在 submissions.game_data 列中，是开发者填写的全部游戏信息。
//! 审核通过后由投影器转换为 games 表的条目。

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// 媒体文件标识（媒体目录下的文件名）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 工作室 / 发行商信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StudioInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// 封面（横版用于列表卡片，竖版用于详情页）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Covers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<MediaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<MediaId>,
}

/// 游戏详情页中的一个图文段落
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameSection {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaId>,
}

/// 外部商店 / 社区链接
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExternalLink {
    /// steam / epic / gog / itch / discord ...
    pub platform: String,
    pub url: String,
}

/// 投稿游戏数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(default)]
pub struct GameData {
    pub name: String,
    pub description: String,

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

    /// 类型标签（对应站点的 genre 分类 slug）
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
}

impl GameData {
    /// 投稿引用的全部媒体文件（去重，保持出现顺序）
    pub fn media(&self) -> Vec<MediaId> {
        let mut out: Vec<MediaId> = Vec::new();
        let candidates = self
            .covers
            .horizontal
            .iter()
            .chain(self.covers.vertical.iter())
            .chain(self.screenshots.iter())
            .chain(self.sections.iter().filter_map(|s| s.image.as_ref()));

        for media in candidates {
            if !out.contains(media) {
                out.push(media.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_collects_covers_screenshots_and_section_images_once() {
        let data = GameData {
            covers: Covers {
                horizontal: Some(MediaId::new("cover_h.webp")),
                vertical: Some(MediaId::new("cover_v.webp")),
            },
            screenshots: vec![MediaId::new("shot_1.webp"), MediaId::new("cover_h.webp")],
            sections: vec![GameSection {
                title: "Gameplay".into(),
                content: "...".into(),
                image: Some(MediaId::new("section_1.webp")),
            }],
            ..Default::default()
        };

        let names: Vec<_> = data.media().iter().map(|m| m.as_str().to_string()).collect();
        assert_eq!(
            names,
            vec!["cover_h.webp", "cover_v.webp", "shot_1.webp", "section_1.webp"]
        );
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let data: GameData = serde_json::from_str(r#"{"name":"Hollow Path"}"#).unwrap();
        assert_eq!(data.name, "Hollow Path");
        assert!(data.screenshots.is_empty());
        assert!(data.covers.horizontal.is_none());
    }
}
