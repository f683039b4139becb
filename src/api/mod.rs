//! 领域 API 模块
//! 每个资源一个模块，把函数调用翻译成 HTTP 请求

pub mod ai_models;
pub mod bugs;
pub mod coding_bugs;
pub mod documents;
pub mod permissions;
pub mod roles;
pub mod workspaces;

pub use ai_models::AiModelApi;
pub use bugs::BugApi;
pub use coding_bugs::CodingBugApi;
pub use documents::DocumentApi;
pub use permissions::PermissionApi;
pub use roles::RoleApi;
pub use workspaces::{WorkspaceApi, WorkspaceCache};

use crate::error::ClientError;

/// 要求响应中带有 data
pub(crate) fn required<T>(data: Option<T>, what: &str) -> Result<T, ClientError> {
    data.ok_or_else(|| ClientError::Decode(format!("{} missing from response", what)))
}
