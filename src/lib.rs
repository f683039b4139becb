//! 管理控制台客户端库
//! 后端 REST API 的类型化客户端，以及角色权限编辑逻辑

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod notify;
pub mod permission_tree;
pub mod role_editor;
pub mod storage;
pub mod telemetry;

pub use client::{ApiClient, RequestContext};
pub use envelope::{unwrap_envelope, ApiEnvelope};
pub use error::ClientError;
pub use role_editor::RoleEditor;
