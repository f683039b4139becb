//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::Secret;
use serde::Deserialize;

use crate::client::RequestContext;

/// 本地开发时使用的固定后端地址
pub const DEFAULT_DEV_URL: &str = "http://localhost:8000/api/v1";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 显式指定的后端地址，设置后忽略 hostname 推导
    pub base_url: Option<String>,
    /// 协议，例如 "http:" 或 "https"
    pub protocol: String,
    /// 控制台所在主机名
    pub hostname: String,
    /// 后端端口
    pub port: u16,
    /// API 路径前缀
    pub prefix: String,
    /// hostname 为 localhost/127.0.0.1 时使用的地址
    pub dev_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// 解析后端地址
    ///
    /// 同一份构建可以在本地、局域网和部署环境中使用，无需重新配置
    pub fn resolve_base_url(&self) -> String {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim().trim_end_matches('/').to_string();
        }

        resolve_base_url(&self.protocol, &self.hostname, self.port, &self.prefix, &self.dev_url)
    }
}

/// 根据当前主机推导后端地址
pub fn resolve_base_url(
    protocol: &str,
    hostname: &str,
    port: u16,
    prefix: &str,
    dev_url: &str,
) -> String {
    let hostname = hostname.trim();
    if hostname.is_empty() || hostname == "localhost" || hostname == "127.0.0.1" {
        return dev_url.trim_end_matches('/').to_string();
    }

    let scheme = protocol.trim().trim_end_matches(':');
    let scheme = if scheme.is_empty() { "http" } else { scheme };

    format!(
        "{}://{}:{}{}",
        scheme,
        hostname,
        port,
        prefix.trim_end_matches('/')
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 预置的 bearer token（使用 Secret 包装，防止日志泄露）
    pub token: Option<Secret<String>>,
    /// 持久化 token 文件路径
    pub token_file: Option<String>,
    /// 会话过期后跳转的登录路由
    pub login_route: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    /// 当前工作空间 ID
    pub current_id: Option<i64>,
    /// 工作空间列表缓存有效期（秒）
    pub cache_ttl_secs: u64,
}

impl WorkspaceConfig {
    /// 以配置中的当前工作空间构建请求上下文
    pub fn request_context(&self) -> RequestContext {
        RequestContext {
            workspace_id: self.current_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub workspace: WorkspaceConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("api.protocol", "http:")?
            .set_default("api.hostname", "localhost")?
            .set_default("api.port", 8000)?
            .set_default("api.prefix", "/api/v1")?
            .set_default("api.dev_url", DEFAULT_DEV_URL)?
            .set_default("api.timeout_secs", 30)?
            .set_default("auth.login_route", "/login")?
            .set_default("workspace.cache_ttl_secs", 300)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        // 从环境变量加载配置（前缀为 CONSOLE_）
        settings = settings.add_source(
            Environment::with_prefix("CONSOLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.api.timeout_secs == 0 || self.api.timeout_secs > 300 {
            return Err(ConfigError::Message(
                "api.timeout_secs must be between 1 and 300".to_string(),
            ));
        }

        if !self.api.prefix.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "api.prefix must start with '/': {}",
                self.api.prefix
            )));
        }

        if !self.auth.login_route.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "auth.login_route must start with '/': {}",
                self.auth.login_route
            )));
        }

        Ok(())
    }
}
