//! 文档、章节、模板、图片与关系

use std::sync::Arc;

use validator::Validate;

use super::required;
use crate::client::{ApiClient, RequestContext};
use crate::error::ClientError;
use crate::models::document::*;
use crate::models::{Page, PageQuery};

/// 文档相关资源都属于当前工作空间，调用方需要传入上下文
pub struct DocumentApi {
    client: Arc<ApiClient>,
}

impl DocumentApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    // ==================== Documents ====================

    pub async fn list(
        &self,
        query: &PageQuery,
        ctx: RequestContext,
    ) -> Result<Page<Document>, ClientError> {
        let page = self.client.get_with_query("/documents", query, ctx).await?;
        Ok(page.unwrap_or_else(Page::empty))
    }

    pub async fn get(&self, id: i64, ctx: RequestContext) -> Result<Document, ClientError> {
        let doc = self.client.get(&format!("/documents/{}", id), ctx).await?;
        required(doc, "document")
    }

    pub async fn create(
        &self,
        req: &CreateDocumentRequest,
        ctx: RequestContext,
    ) -> Result<Document, ClientError> {
        req.validate()?;
        let doc = self.client.post("/documents", req, ctx).await?;
        required(doc, "document")
    }

    pub async fn update(
        &self,
        id: i64,
        req: &UpdateDocumentRequest,
        ctx: RequestContext,
    ) -> Result<Document, ClientError> {
        req.validate()?;
        let doc = self
            .client
            .put(&format!("/documents/{}", id), req, ctx)
            .await?;
        required(doc, "document")
    }

    pub async fn delete(&self, id: i64, ctx: RequestContext) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/documents/{}", id), ctx)
            .await?;
        Ok(())
    }

    // ==================== Sections ====================

    pub async fn sections(
        &self,
        document_id: i64,
        ctx: RequestContext,
    ) -> Result<Vec<Section>, ClientError> {
        let sections = self
            .client
            .get(&format!("/documents/{}/sections", document_id), ctx)
            .await?;
        Ok(sections.unwrap_or_default())
    }

    pub async fn create_section(
        &self,
        req: &CreateSectionRequest,
        ctx: RequestContext,
    ) -> Result<Section, ClientError> {
        req.validate()?;
        let section = self.client.post("/sections", req, ctx).await?;
        required(section, "section")
    }

    pub async fn update_section(
        &self,
        id: i64,
        req: &UpdateSectionRequest,
        ctx: RequestContext,
    ) -> Result<Section, ClientError> {
        req.validate()?;
        let section = self
            .client
            .put(&format!("/sections/{}", id), req, ctx)
            .await?;
        required(section, "section")
    }

    pub async fn delete_section(&self, id: i64, ctx: RequestContext) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/sections/{}", id), ctx)
            .await?;
        Ok(())
    }

    // ==================== Templates ====================

    pub async fn templates(&self, ctx: RequestContext) -> Result<Vec<Template>, ClientError> {
        let templates = self.client.get("/templates", ctx).await?;
        Ok(templates.unwrap_or_default())
    }

    pub async fn create_template(
        &self,
        req: &SaveTemplateRequest,
        ctx: RequestContext,
    ) -> Result<Template, ClientError> {
        req.validate()?;
        let template = self.client.post("/templates", req, ctx).await?;
        required(template, "template")
    }

    pub async fn update_template(
        &self,
        id: i64,
        req: &SaveTemplateRequest,
        ctx: RequestContext,
    ) -> Result<Template, ClientError> {
        req.validate()?;
        let template = self
            .client
            .put(&format!("/templates/{}", id), req, ctx)
            .await?;
        required(template, "template")
    }

    pub async fn delete_template(&self, id: i64, ctx: RequestContext) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/templates/{}", id), ctx)
            .await?;
        Ok(())
    }

    // ==================== Images ====================

    pub async fn images(
        &self,
        document_id: i64,
        ctx: RequestContext,
    ) -> Result<Vec<Image>, ClientError> {
        let images = self
            .client
            .get_with_query("/images", &DocumentFilter { document_id }, ctx)
            .await?;
        Ok(images.unwrap_or_default())
    }

    pub async fn delete_image(&self, id: i64, ctx: RequestContext) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/images/{}", id), ctx)
            .await?;
        Ok(())
    }

    // ==================== Relations ====================

    pub async fn relations(
        &self,
        document_id: i64,
        ctx: RequestContext,
    ) -> Result<Vec<Relation>, ClientError> {
        let relations = self
            .client
            .get_with_query("/relations", &DocumentFilter { document_id }, ctx)
            .await?;
        Ok(relations.unwrap_or_default())
    }

    pub async fn create_relation(
        &self,
        req: &CreateRelationRequest,
        ctx: RequestContext,
    ) -> Result<Relation, ClientError> {
        req.validate()?;
        if req.source_id == req.target_id {
            return Err(ClientError::Validation(
                "A document cannot be related to itself".to_string(),
            ));
        }
        let relation = self.client.post("/relations", req, ctx).await?;
        required(relation, "relation")
    }

    pub async fn delete_relation(&self, id: i64, ctx: RequestContext) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/relations/{}", id), ctx)
            .await?;
        Ok(())
    }
}
