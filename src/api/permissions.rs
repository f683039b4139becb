//! 权限管理

use std::sync::Arc;

use validator::Validate;

use super::required;
use crate::client::{ApiClient, RequestContext};
use crate::error::ClientError;
use crate::models::permission::*;

pub struct PermissionApi {
    client: Arc<ApiClient>,
}

impl PermissionApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// 完整权限森林
    pub async fn tree(&self) -> Result<Vec<Permission>, ClientError> {
        let tree = self
            .client
            .get("/permissions/tree", RequestContext::none())
            .await?;
        Ok(tree.unwrap_or_default())
    }

    /// 扁平列表（不含 children）
    pub async fn list(&self) -> Result<Vec<Permission>, ClientError> {
        let list = self.client.get("/permissions", RequestContext::none()).await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn create(&self, req: &CreatePermissionRequest) -> Result<Permission, ClientError> {
        req.validate()?;
        let perm = self
            .client
            .post("/permissions", req, RequestContext::none())
            .await?;
        required(perm, "permission")
    }

    pub async fn update(
        &self,
        id: i64,
        req: &UpdatePermissionRequest,
    ) -> Result<Permission, ClientError> {
        req.validate()?;
        let perm = self
            .client
            .put(&format!("/permissions/{}", id), req, RequestContext::none())
            .await?;
        required(perm, "permission")
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/permissions/{}", id), RequestContext::none())
            .await?;
        Ok(())
    }
}
