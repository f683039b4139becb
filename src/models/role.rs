//! Role domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::permission::Permission;

/// Role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: RoleStatus,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Role {
    /// 角色当前授予的权限 ID（含嵌套 children）
    pub fn granted_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        crate::permission_tree::collect_ids(&self.permissions, &mut ids);
        ids
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    #[default]
    Active,
    Disabled,
}

/// Create role request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub status: RoleStatus,
    /// 创建时一并授予的权限
    pub permission_ids: Vec<i64>,
}

/// Update role request
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateRoleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RoleStatus>,
}

/// Assign permissions request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPermissionsRequest {
    pub permission_ids: Vec<i64>,
}
