//! 响应信封
//! 后端所有响应统一为 `{success, message, data, error_code?}`

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// `success: false` 且没有 message 时使用的默认消息
pub const FALLBACK_MESSAGE: &str = "Request failed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error_code: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error_code: None,
        }
    }

    /// 成功时返回 data（可能为 None），失败时返回 Business 错误
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        unwrap_envelope(self)
    }

    /// 同 into_result，但要求 data 存在
    pub fn require_data(self) -> Result<T, ClientError> {
        self.into_result()?
            .ok_or_else(|| ClientError::Decode("response envelope carried no data".to_string()))
    }
}

/// 解包响应信封
pub fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<Option<T>, ClientError> {
    if envelope.success {
        return Ok(envelope.data);
    }

    let message = envelope
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

    Err(ClientError::Business {
        message,
        error_code: envelope.error_code,
    })
}
