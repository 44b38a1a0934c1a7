//! 数据实体模块
//!
//! 包含所有 SeaORM 实体定义和 JSON 数据结构。

pub mod prelude;

// === JSON 数据结构（嵌入各表的 JSON 列）===
pub mod game_data;
pub mod submission_meta;

// === SeaORM 实体（对应数据库表）===
pub mod games;
pub mod notification_outbox;
pub mod settings;
pub mod submissions;
pub mod users;
