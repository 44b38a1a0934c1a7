use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// 为本地 SQLite 构建连接选项
///
/// 对于本地 SQLite，连接池大小为 1 即可；内存数据库也依赖单连接保持同一份数据
fn sqlite_options(connection_string: String) -> ConnectOptions {
    let mut options = ConnectOptions::new(connection_string);
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    options
}

/// Establish a SeaORM database connection.
pub async fn establish_connection(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // 1. 确保数据库所在的目录存在
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            DbErr::Conn(RuntimeErr::Internal(format!("无法创建数据库目录: {}", e)))
        })?;
    }

    if db_path.exists() {
        log::info!("使用数据库: {}", db_path.display());
    } else {
        log::info!("首次启动，创建数据库: {}", db_path.display());
    }

    // 2. 使用 `url` crate 安全地构建连接字符串
    let db_url = Url::from_file_path(db_path).map_err(|_| {
        DbErr::Conn(RuntimeErr::Internal(format!(
            "Invalid database path: {}",
            db_path.display()
        )))
    })?;

    let connection_string = format!("sqlite:{}?mode=rwc", db_url.path());

    // 3. 连接数据库
    Database::connect(sqlite_options(connection_string)).await
}

/// 建立内存数据库连接（测试和临时实例使用）
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    Database::connect(sqlite_options("sqlite::memory:".to_string())).await
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}
