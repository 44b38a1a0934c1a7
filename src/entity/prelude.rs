//! 预导入模块
//!
//! 提供常用类型的快捷导入。

// === SeaORM 实体 ===
pub use super::games::Entity as Games;
pub use super::notification_outbox::Entity as NotificationOutbox;
pub use super::settings::Entity as Settings;
pub use super::submissions::Entity as Submissions;
pub use super::users::Entity as Users;

// === 常用枚举 ===
pub use super::submissions::SubmissionStatus;
pub use super::users::{DeveloperStatus, UserRole};
