//! 工作空间与成员管理

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use validator::Validate;

use super::required;
use crate::client::{ApiClient, RequestContext};
use crate::error::ClientError;
use crate::models::workspace::*;

/// 工作空间列表默认缓存时间
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Default)]
struct CacheState {
    list: Option<(Instant, Vec<Workspace>)>,
    default: Option<(Instant, Option<Workspace>)>,
}

/// 工作空间列表与默认工作空间的缓存
///
/// 固定有效期，后写入者覆盖先写入者
pub struct WorkspaceCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl WorkspaceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn fresh(&self, stored_at: Instant) -> bool {
        stored_at.elapsed() < self.ttl
    }

    pub async fn list(&self) -> Option<Vec<Workspace>> {
        let state = self.state.read().await;
        state
            .list
            .as_ref()
            .filter(|(at, _)| self.fresh(*at))
            .map(|(_, list)| list.clone())
    }

    pub async fn store_list(&self, list: Vec<Workspace>) {
        self.state.write().await.list = Some((Instant::now(), list));
    }

    /// 外层 None 表示未缓存或已过期，内层 None 表示后端没有默认工作空间
    pub async fn default_workspace(&self) -> Option<Option<Workspace>> {
        let state = self.state.read().await;
        state
            .default
            .as_ref()
            .filter(|(at, _)| self.fresh(*at))
            .map(|(_, ws)| ws.clone())
    }

    pub async fn store_default(&self, workspace: Option<Workspace>) {
        self.state.write().await.default = Some((Instant::now(), workspace));
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.list = None;
        state.default = None;
        tracing::debug!("Workspace cache invalidated");
    }
}

impl Default for WorkspaceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

pub struct WorkspaceApi {
    client: Arc<ApiClient>,
    cache: Arc<WorkspaceCache>,
}

impl WorkspaceApi {
    pub fn new(client: Arc<ApiClient>, cache: Arc<WorkspaceCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &Arc<WorkspaceCache> {
        &self.cache
    }

    /// 列出当前用户可见的工作空间，`refresh` 为 true 时跳过缓存
    pub async fn list(&self, refresh: bool) -> Result<Vec<Workspace>, ClientError> {
        if !refresh {
            if let Some(list) = self.cache.list().await {
                return Ok(list);
            }
        }

        let list: Vec<Workspace> = self
            .client
            .get("/workspaces", RequestContext::none())
            .await?
            .unwrap_or_default();

        self.cache.store_list(list.clone()).await;
        Ok(list)
    }

    pub async fn default_workspace(&self, refresh: bool) -> Result<Option<Workspace>, ClientError> {
        if !refresh {
            if let Some(ws) = self.cache.default_workspace().await {
                return Ok(ws);
            }
        }

        let ws: Option<Workspace> = self
            .client
            .get("/workspaces/default", RequestContext::none())
            .await?;

        self.cache.store_default(ws.clone()).await;
        Ok(ws)
    }

    pub async fn get(&self, id: i64) -> Result<Workspace, ClientError> {
        let ws = self
            .client
            .get(&format!("/workspaces/{}", id), RequestContext::none())
            .await?;
        required(ws, "workspace")
    }

    pub async fn create(&self, req: &CreateWorkspaceRequest) -> Result<Workspace, ClientError> {
        req.validate()?;
        let ws = self
            .client
            .post("/workspaces", req, RequestContext::none())
            .await?;
        self.cache.invalidate().await;
        required(ws, "workspace")
    }

    pub async fn update(
        &self,
        id: i64,
        req: &UpdateWorkspaceRequest,
    ) -> Result<Workspace, ClientError> {
        req.validate()?;
        let ws = self
            .client
            .put(&format!("/workspaces/{}", id), req, RequestContext::none())
            .await?;
        self.cache.invalidate().await;
        required(ws, "workspace")
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/workspaces/{}", id), RequestContext::none())
            .await?;
        self.cache.invalidate().await;
        Ok(())
    }

    // ==================== Members ====================

    pub async fn members(&self, workspace_id: i64) -> Result<Vec<WorkspaceMember>, ClientError> {
        let members = self
            .client
            .get(
                &format!("/workspaces/{}/members", workspace_id),
                RequestContext::none(),
            )
            .await?;
        Ok(members.unwrap_or_default())
    }

    pub async fn add_member(
        &self,
        workspace_id: i64,
        req: &AddMemberRequest,
    ) -> Result<WorkspaceMember, ClientError> {
        if req.role == MemberRole::Owner {
            return Err(ClientError::Validation(
                "Ownership cannot be granted when adding a member".to_string(),
            ));
        }
        let member = self
            .client
            .post(
                &format!("/workspaces/{}/members", workspace_id),
                req,
                RequestContext::none(),
            )
            .await?;
        required(member, "member")
    }

    pub async fn update_member_role(
        &self,
        workspace_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<WorkspaceMember, ClientError> {
        let member = self
            .client
            .put(
                &format!("/workspaces/{}/members/{}", workspace_id, user_id),
                &UpdateMemberRoleRequest { role },
                RequestContext::none(),
            )
            .await?;
        required(member, "member")
    }

    pub async fn remove_member(&self, workspace_id: i64, user_id: i64) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(
                &format!("/workspaces/{}/members/{}", workspace_id, user_id),
                RequestContext::none(),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(id: i64) -> Workspace {
        Workspace {
            id,
            name: format!("ws-{}", id),
            description: None,
            is_default: id == 1,
            owner_id: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_cache_fresh_within_ttl() {
        let cache = WorkspaceCache::default();
        assert!(cache.list().await.is_none());

        cache.store_list(vec![ws(1), ws(2)]).await;
        assert_eq!(cache.list().await.map(|l| l.len()), Some(2));

        cache.store_default(Some(ws(1))).await;
        assert_eq!(cache.default_workspace().await, Some(Some(ws(1))));
    }

    #[tokio::test]
    async fn test_cache_expires() {
        let cache = WorkspaceCache::new(Duration::ZERO);
        cache.store_list(vec![ws(1)]).await;
        assert!(cache.list().await.is_none());
    }

    #[tokio::test]
    async fn test_cache_last_writer_wins_and_invalidate() {
        let cache = WorkspaceCache::default();
        cache.store_list(vec![ws(1)]).await;
        cache.store_list(vec![ws(3)]).await;
        assert_eq!(cache.list().await, Some(vec![ws(3)]));

        cache.store_default(None).await;
        assert_eq!(cache.default_workspace().await, Some(None));

        cache.invalidate().await;
        assert!(cache.list().await.is_none());
        assert!(cache.default_workspace().await.is_none());
    }
}
