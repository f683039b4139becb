//! 缺陷档案与发生记录

use std::sync::Arc;

use validator::Validate;

use super::required;
use crate::client::{ApiClient, RequestContext};
use crate::error::ClientError;
use crate::models::bug::*;
use crate::models::Page;

pub struct BugApi {
    client: Arc<ApiClient>,
}

impl BugApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        query: &BugQuery,
        ctx: RequestContext,
    ) -> Result<Page<BugProfile>, ClientError> {
        let page = self.client.get_with_query("/bugs", query, ctx).await?;
        Ok(page.unwrap_or_else(Page::empty))
    }

    pub async fn get(&self, id: i64, ctx: RequestContext) -> Result<BugProfile, ClientError> {
        let bug = self.client.get(&format!("/bugs/{}", id), ctx).await?;
        required(bug, "bug")
    }

    pub async fn create(
        &self,
        req: &CreateBugRequest,
        ctx: RequestContext,
    ) -> Result<BugProfile, ClientError> {
        req.validate()?;
        let bug = self.client.post("/bugs", req, ctx).await?;
        required(bug, "bug")
    }

    pub async fn update(
        &self,
        id: i64,
        req: &UpdateBugRequest,
        ctx: RequestContext,
    ) -> Result<BugProfile, ClientError> {
        req.validate()?;
        let bug = self.client.put(&format!("/bugs/{}", id), req, ctx).await?;
        required(bug, "bug")
    }

    pub async fn delete(&self, id: i64, ctx: RequestContext) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/bugs/{}", id), ctx)
            .await?;
        Ok(())
    }

    /// 记录一次缺陷发生
    pub async fn log_occurrence(
        &self,
        bug_id: i64,
        req: &LogOccurrenceRequest,
        ctx: RequestContext,
    ) -> Result<BugOccurrence, ClientError> {
        req.validate()?;
        let occurrence = self
            .client
            .post(&format!("/bugs/{}/occurrences", bug_id), req, ctx)
            .await?;
        required(occurrence, "occurrence")
    }

    pub async fn occurrences(
        &self,
        bug_id: i64,
        ctx: RequestContext,
    ) -> Result<Vec<BugOccurrence>, ClientError> {
        let list = self
            .client
            .get(&format!("/bugs/{}/occurrences", bug_id), ctx)
            .await?;
        Ok(list.unwrap_or_default())
    }
}
