//! 角色管理

use std::sync::Arc;

use validator::Validate;

use super::required;
use crate::client::{ApiClient, RequestContext};
use crate::error::ClientError;
use crate::models::permission::Permission;
use crate::models::role::*;

pub struct RoleApi {
    client: Arc<ApiClient>,
}

impl RoleApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// 列出所有角色
    pub async fn list(&self) -> Result<Vec<Role>, ClientError> {
        let roles = self.client.get("/roles", RequestContext::none()).await?;
        Ok(roles.unwrap_or_default())
    }

    pub async fn get(&self, id: i64) -> Result<Role, ClientError> {
        let role = self
            .client
            .get(&format!("/roles/{}", id), RequestContext::none())
            .await?;
        required(role, "role")
    }

    pub async fn create(&self, req: &CreateRoleRequest) -> Result<Role, ClientError> {
        req.validate()?;
        let role = self.client.post("/roles", req, RequestContext::none()).await?;
        required(role, "role")
    }

    pub async fn update(&self, id: i64, req: &UpdateRoleRequest) -> Result<Role, ClientError> {
        req.validate()?;
        let role = self
            .client
            .put(&format!("/roles/{}", id), req, RequestContext::none())
            .await?;
        required(role, "role")
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/roles/{}", id), RequestContext::none())
            .await?;
        Ok(())
    }

    /// 角色当前拥有的权限
    pub async fn permissions(&self, id: i64) -> Result<Vec<Permission>, ClientError> {
        let perms = self
            .client
            .get(&format!("/roles/{}/permissions", id), RequestContext::none())
            .await?;
        Ok(perms.unwrap_or_default())
    }

    /// 覆盖角色的权限集合
    pub async fn assign_permissions(
        &self,
        id: i64,
        permission_ids: Vec<i64>,
    ) -> Result<(), ClientError> {
        tracing::info!(role_id = id, count = permission_ids.len(), "Assigning role permissions");

        self.client
            .put::<_, serde_json::Value>(
                &format!("/roles/{}/permissions", id),
                &AssignPermissionsRequest { permission_ids },
                RequestContext::none(),
            )
            .await?;
        Ok(())
    }
}
