use std::path::PathBuf;

/// 数据目录相关常量
pub const DB_DATA_DIR: &str = "data";
pub const DB_FILE_NAME: &str = "sisme_games.db";
pub const MEDIA_SUBDIR: &str = "media";
pub const RESOURCE_DIR: &str = "resources";

/// 显式指定数据目录的环境变量（优先级最高）
pub const DATA_DIR_ENV: &str = "SISME_DATA_DIR";

/// 判断是否处于便携模式
///
/// 检测逻辑：检查可执行文件同级目录下是否存在 resources/data/sisme_games.db
pub fn is_portable_mode() -> bool {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let portable_data_dir = exe_dir.join(RESOURCE_DIR).join(DB_DATA_DIR);
            let portable_db_file = portable_data_dir.join(DB_FILE_NAME);
            return portable_data_dir.exists() && portable_db_file.exists();
        }
    }
    false
}

/// 获取基础数据目录
///
/// 顺序：`SISME_DATA_DIR` 环境变量 → 便携模式目录 → 系统数据目录
pub fn get_base_data_dir() -> Result<PathBuf, String> {
    if let Some(dir) = env_data_dir() {
        return Ok(dir);
    }
    get_base_data_dir_for_mode(is_portable_mode())
}

/// 获取指定模式的基础数据目录（忽略环境变量）
pub fn get_base_data_dir_for_mode(portable: bool) -> Result<PathBuf, String> {
    if portable {
        let exe_path =
            std::env::current_exe().map_err(|e| format!("无法获取可执行文件路径: {}", e))?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| "无法获取可执行文件父目录".to_string())?;
        Ok(exe_dir.join(RESOURCE_DIR))
    } else {
        get_system_data_dir()
    }
}

fn env_data_dir() -> Option<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// 获取系统数据目录（跨平台）
fn get_system_data_dir() -> Result<PathBuf, String> {
    use directories::BaseDirs;

    let base_dirs = BaseDirs::new().ok_or_else(|| "无法获取系统目录信息".to_string())?;

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    {
        Ok(base_dirs.data_dir().join("fr.sisme.games-editor"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Ok(base_dirs.data_dir().join("sisme-games-editor"))
    }
}

/// 获取数据库文件路径
pub fn get_db_path() -> Result<PathBuf, String> {
    Ok(get_base_data_dir()?.join(DB_DATA_DIR).join(DB_FILE_NAME))
}

/// 获取默认的媒体文件目录（封面、截图）
pub fn get_default_media_path() -> Result<PathBuf, String> {
    Ok(get_base_data_dir()?.join(MEDIA_SUBDIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins_and_paths_share_the_base_dir() {
        std::env::set_var(DATA_DIR_ENV, "/tmp/sisme-path-test");
        let base = get_base_data_dir().unwrap();
        assert_eq!(base, PathBuf::from("/tmp/sisme-path-test"));
        assert_eq!(
            get_db_path().unwrap(),
            base.join(DB_DATA_DIR).join(DB_FILE_NAME)
        );
        assert_eq!(get_default_media_path().unwrap(), base.join(MEDIA_SUBDIR));
    }
}
