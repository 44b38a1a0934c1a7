//! 投稿审核：状态守卫、发布投影、存储接口与编排

pub mod error;
pub mod guard;
pub mod locks;
pub mod projector;
pub mod store;
pub mod validation;
pub mod workflow;

pub use error::{ErrorKind, ReviewError, ReviewResult};
pub use guard::{ReviewAction, Transition};
pub use workflow::{ReviewWorkflow, WorkflowParts};
