//! AI 模型配置与连接池

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModel {
    pub id: i64,
    pub name: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub max_connections: u32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct SaveAiModelRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub provider: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(url)]
    pub base_url: Option<String>,
    /// 只在写入时发送
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,
    pub enabled: bool,
    pub is_default: bool,
}

/// 连接测试结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub ok: bool,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 单个模型的连接池状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    pub model_id: i64,
    pub active: u32,
    pub idle: u32,
    pub max: u32,
}
