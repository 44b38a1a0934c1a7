use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

/// 动态设置日志输出级别（不持久化）
pub fn set_log_level(level: &str) -> Result<LogLevel, String> {
    let lf = match level.trim().to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        "off" => log::LevelFilter::Off,
        other => return Err(format!("无效的日志级别: {}", other)),
    };
    log::set_max_level(lf);
    log::info!("日志级别已调整为 {}", lf);
    Ok(get_log_level())
}

/// 获取当前日志级别
pub fn get_log_level() -> LogLevel {
    let level = log::max_level();
    match level {
        log::LevelFilter::Error => LogLevel::Error,
        log::LevelFilter::Warn => LogLevel::Warn,
        log::LevelFilter::Info => LogLevel::Info,
        log::LevelFilter::Debug => LogLevel::Debug,
        log::LevelFilter::Trace => LogLevel::Trace,
        log::LevelFilter::Off => LogLevel::Off,
    }
}
