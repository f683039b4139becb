//! AI 模型配置与连接池管理

use std::sync::Arc;

use validator::Validate;

use super::required;
use crate::client::{ApiClient, RequestContext};
use crate::error::ClientError;
use crate::models::ai_model::*;

pub struct AiModelApi {
    client: Arc<ApiClient>,
}

impl AiModelApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<AiModel>, ClientError> {
        let models = self.client.get("/ai-models", RequestContext::none()).await?;
        Ok(models.unwrap_or_default())
    }

    pub async fn create(&self, req: &SaveAiModelRequest) -> Result<AiModel, ClientError> {
        req.validate()?;
        let model = self
            .client
            .post("/ai-models", req, RequestContext::none())
            .await?;
        required(model, "ai model")
    }

    pub async fn update(&self, id: i64, req: &SaveAiModelRequest) -> Result<AiModel, ClientError> {
        req.validate()?;
        let model = self
            .client
            .put(&format!("/ai-models/{}", id), req, RequestContext::none())
            .await?;
        required(model, "ai model")
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&format!("/ai-models/{}", id), RequestContext::none())
            .await?;
        Ok(())
    }

    /// 测试模型连接
    pub async fn test_connection(&self, id: i64) -> Result<ConnectionTestResult, ClientError> {
        let result = self
            .client
            .post(
                &format!("/ai-models/{}/test", id),
                &serde_json::json!({}),
                RequestContext::none(),
            )
            .await?;
        required(result, "connection test result")
    }

    pub async fn pool_status(&self) -> Result<Vec<PoolStatus>, ClientError> {
        let status = self
            .client
            .get("/ai-models/pool", RequestContext::none())
            .await?;
        Ok(status.unwrap_or_default())
    }

    /// 重置某个模型的连接池
    pub async fn reset_pool(&self, id: i64) -> Result<(), ClientError> {
        tracing::info!(model_id = id, "Resetting AI model connection pool");
        self.client
            .post::<_, serde_json::Value>(
                &format!("/ai-models/{}/pool/reset", id),
                &serde_json::json!({}),
                RequestContext::none(),
            )
            .await?;
        Ok(())
    }
}
