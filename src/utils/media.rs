//! 媒体文件管理
//!
//! 投稿引用的封面、截图、段落配图都以文件形式存放在媒体目录下，
//! 投稿中只保存文件名（MediaId）。

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use crate::entity::game_data::MediaId;
use crate::review::store::MediaStore;

/// 基于本地目录的媒体存储
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 把媒体 ID 解析为媒体目录内的路径
    ///
    /// 只接受普通文件名，拒绝 `..`、绝对路径和多级路径
    pub fn resolve(&self, media: &MediaId) -> Option<PathBuf> {
        let candidate = Path::new(media.as_str());
        let mut components = candidate.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }
}

/// 媒体 ID 是否为合法的普通文件名
pub fn is_plain_file_name(media: &MediaId) -> bool {
    let candidate = Path::new(media.as_str());
    let mut components = candidate.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn remove(&self, media: &[MediaId]) -> usize {
        let mut removed = 0;

        for item in media {
            let Some(path) = self.resolve(item) else {
                log::warn!("忽略非法媒体文件名: {}", item.as_str());
                continue;
            };

            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // 文件已不存在，视为成功
                    log::debug!("媒体文件不存在: {}", path.display());
                }
                Err(e) => {
                    // 继续删除其他文件，不中断流程
                    log::warn!("删除媒体文件失败 {}: {}", path.display(), e);
                }
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sisme-media-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn resolve_rejects_paths_outside_the_media_root() {
        let store = FsMediaStore::new("/srv/media");
        assert_eq!(
            store.resolve(&MediaId::new("cover.webp")),
            Some(PathBuf::from("/srv/media/cover.webp"))
        );
        assert!(store.resolve(&MediaId::new("../db.sqlite")).is_none());
        assert!(store.resolve(&MediaId::new("/etc/passwd")).is_none());
        assert!(store.resolve(&MediaId::new("a/b.webp")).is_none());
        assert!(store.resolve(&MediaId::new("")).is_none());
    }

    #[tokio::test]
    async fn remove_deletes_existing_files_and_skips_missing_ones() {
        let root = temp_root("remove");
        std::fs::write(root.join("shot_1.webp"), b"x").unwrap();
        std::fs::write(root.join("keep.webp"), b"x").unwrap();

        let store = FsMediaStore::new(&root);
        let removed = store
            .remove(&[MediaId::new("shot_1.webp"), MediaId::new("missing.webp")])
            .await;

        assert_eq!(removed, 1);
        assert!(!root.join("shot_1.webp").exists());
        assert!(root.join("keep.webp").exists());

        std::fs::remove_dir_all(root).unwrap();
    }
}
