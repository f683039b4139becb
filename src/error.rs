//! 统一错误模型
//! 定义客户端所有错误类型，以及错误到用户通知的分类

use thiserror::Error;

use crate::notify::NoticeKind;

/// 客户端错误类型
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// 未收到任何响应（连接失败等）
    #[error("Network error: {0}")]
    Network(String),

    /// 请求超时，按网络错误处理
    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Session expired: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// 响应体 `success: false`
    #[error("Request failed: {message}")]
    Business {
        message: String,
        error_code: Option<String>,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// 表单校验失败，不会到达 HTTP 层
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request path: {0}")]
    InvalidPath(String),
}

impl ClientError {
    /// HTTP 状态码（如果错误来自一个 HTTP 响应）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Forbidden(_) => Some(403),
            ClientError::Server { status, .. } | ClientError::Http { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// 错误对应的通知类别
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            ClientError::Network(_) | ClientError::Timeout(_) => NoticeKind::Network,
            ClientError::Unauthorized(_) => NoticeKind::SessionExpired,
            ClientError::Forbidden(_) => NoticeKind::Forbidden,
            ClientError::Server { .. } => NoticeKind::ServerError,
            ClientError::Http { .. } | ClientError::InvalidPath(_) => NoticeKind::Http,
            ClientError::Business { .. } => NoticeKind::Business,
            ClientError::Decode(_) | ClientError::Validation(_) | ClientError::Config(_) => {
                NoticeKind::Warning
            }
        }
    }

    /// 面向用户的错误消息
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) | ClientError::Timeout(_) => {
                "Network connection failed, please check your connection".to_string()
            }
            ClientError::Unauthorized(_) => "Session expired, please log in again".to_string(),
            ClientError::Forbidden(msg) => msg.clone(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Http { message, .. } => message.clone(),
            ClientError::Business { message, .. } => message.clone(),
            ClientError::Decode(_) => "Unexpected response from server".to_string(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Config(_) => "Configuration error".to_string(),
            ClientError::InvalidPath(path) => format!("Invalid request path: {}", path),
        }
    }

    /// 是否为传输层失败（无响应）
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e.to_string())
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(e: validator::ValidationErrors) -> Self {
        ClientError::Validation(e.to_string())
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(e: config::ConfigError) -> Self {
        ClientError::Config(e.to_string())
    }
}
