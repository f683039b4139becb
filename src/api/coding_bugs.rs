//! 外部缺陷追踪服务的同步、配置与关联

use std::sync::Arc;

use validator::Validate;

use super::required;
use crate::client::{ApiClient, RequestContext};
use crate::error::ClientError;
use crate::models::bug::*;
use crate::models::{Page, PageQuery};

pub struct CodingBugApi {
    client: Arc<ApiClient>,
}

impl CodingBugApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        query: &PageQuery,
        ctx: RequestContext,
    ) -> Result<Page<CodingBug>, ClientError> {
        let page = self
            .client
            .get_with_query("/coding-bugs", query, ctx)
            .await?;
        Ok(page.unwrap_or_else(Page::empty))
    }

    /// 从外部服务拉取最新缺陷
    pub async fn sync(&self, ctx: RequestContext) -> Result<SyncSummary, ClientError> {
        let summary: Option<SyncSummary> = self
            .client
            .post("/coding-bugs/sync", &serde_json::json!({}), ctx)
            .await?;
        let summary = required(summary, "sync summary")?;

        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            failed = summary.failed,
            "External issue sync finished"
        );
        Ok(summary)
    }

    pub async fn config(&self, ctx: RequestContext) -> Result<Option<CodingConfig>, ClientError> {
        self.client.get("/coding-bugs/config", ctx).await
    }

    pub async fn update_config(
        &self,
        config: &CodingConfig,
        ctx: RequestContext,
    ) -> Result<CodingConfig, ClientError> {
        config.validate()?;
        let saved = self.client.put("/coding-bugs/config", config, ctx).await?;
        required(saved, "config")
    }

    /// 关联到本地缺陷档案
    pub async fn link(
        &self,
        coding_bug_id: i64,
        bug_id: i64,
        ctx: RequestContext,
    ) -> Result<CodingBug, ClientError> {
        let linked = self
            .client
            .post(
                &format!("/coding-bugs/{}/link", coding_bug_id),
                &LinkBugRequest { bug_id },
                ctx,
            )
            .await?;
        required(linked, "coding bug")
    }

    pub async fn unlink(&self, coding_bug_id: i64, ctx: RequestContext) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/coding-bugs/{}/link", coding_bug_id), ctx)
            .await?;
        Ok(())
    }
}
