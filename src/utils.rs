pub mod logs;
pub mod media;
pub mod security;
pub mod slug;
