//! 后端 API 客户端
//!
//! 所有请求的唯一出口：负责拼接地址、注入 token 与工作空间上下文、
//! 按状态码分类错误并发出用户通知。该层不做任何重试。

use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::envelope::ApiEnvelope;
use crate::error::ClientError;
use crate::notify::{Notice, NoticeKind, Notifier};
use crate::storage::TokenStore;

/// 当前工作空间的请求头
pub const WORKSPACE_HEADER: &str = "X-Workspace-Id";
/// 当前工作空间的查询参数
pub const WORKSPACE_QUERY_KEY: &str = "workspace_id";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// 路径中已经指定了工作空间，例如 `/workspaces/12/members`
static WORKSPACE_SCOPED_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|/)workspaces/\d+/").expect("valid workspace path regex"));

/// 单次请求的上下文
///
/// 当前工作空间由调用方显式传入，而不是由客户端从全局状态中读取
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub workspace_id: Option<i64>,
}

impl RequestContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn workspace(id: i64) -> Self {
        Self {
            workspace_id: Some(id),
        }
    }

    /// 针对给定路径实际需要注入的工作空间 ID
    pub fn injected_workspace(&self, path: &str) -> Option<i64> {
        if is_workspace_scoped(path) {
            return None;
        }
        self.workspace_id
    }
}

/// 路径是否已经指定了工作空间
pub fn is_workspace_scoped(path: &str) -> bool {
    WORKSPACE_SCOPED_PATH.is_match(path)
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    login_route: String,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(&base_url.into())?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            tokens,
            notifier,
        })
    }

    pub fn from_config(
        config: &AppConfig,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let client = Self::new(
            config.api.resolve_base_url(),
            Duration::from_secs(config.api.timeout_secs),
            tokens,
            notifier,
        )?;

        Ok(client.with_login_route(config.auth.login_route.clone()))
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// 拼接完整地址
    pub fn endpoint(&self, path: &str) -> Result<String, ClientError> {
        if !path.starts_with('/') || path.contains("://") {
            return Err(ClientError::InvalidPath(path.to_string()));
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    // ==================== 解包后的请求 ====================

    pub async fn get<T>(&self, path: &str, ctx: RequestContext) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        self.send::<(), (), T>(Method::GET, path, None, None, ctx).await
    }

    pub async fn get_with_query<Q, T>(
        &self,
        path: &str,
        query: &Q,
        ctx: RequestContext,
    ) -> Result<Option<T>, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send::<Q, (), T>(Method::GET, path, Some(query), None, ctx)
            .await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        ctx: RequestContext,
    ) -> Result<Option<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send::<(), B, T>(Method::POST, path, None, Some(body), ctx)
            .await
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        body: &B,
        ctx: RequestContext,
    ) -> Result<Option<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send::<(), B, T>(Method::PUT, path, None, Some(body), ctx)
            .await
    }

    pub async fn delete<T>(&self, path: &str, ctx: RequestContext) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        self.send::<(), (), T>(Method::DELETE, path, None, None, ctx)
            .await
    }

    /// 发送请求并解包信封，业务失败同样会发出通知
    pub async fn send<Q, B, T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
        ctx: RequestContext,
    ) -> Result<Option<T>, ClientError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = self.raw(method, path, query, body, ctx).await?;

        match envelope.into_result() {
            Ok(data) => Ok(data),
            Err(err) => {
                warn!(path = %path, error = %err, "Business failure reported by backend");
                self.report(&err);
                Err(err)
            }
        }
    }

    // ==================== 原始信封 ====================

    /// 发送请求并返回未解包的信封
    ///
    /// HTTP 层失败仍会被分类并通知；`success: false` 交给调用方自行判断
    pub async fn raw<Q, B, T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
        ctx: RequestContext,
    ) -> Result<ApiEnvelope<T>, ClientError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let method_label = method.to_string();

        let mut request = self
            .http
            .request(method, url.as_str())
            .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()));

        if let Some(token) = self.tokens.load() {
            request = request.bearer_auth(token.expose_secret());
        }

        if let Some(query) = query {
            request = request.query(query);
        }

        if let Some(workspace_id) = ctx.injected_workspace(path) {
            request = request
                .query(&[(WORKSPACE_QUERY_KEY, workspace_id)])
                .header(WORKSPACE_HEADER, workspace_id.to_string());
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ClientError::from(e);
                record_request(&method_label, "network_error");
                warn!(method = %method_label, path = %path, error = %err, "Request failed without response");
                self.report(&err);
                return Err(err);
            }
        };

        let status = response.status();
        debug!(
            method = %method_label,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            record_request(&method_label, "http_error");
            warn!(method = %method_label, path = %path, status = status.as_u16(), error = %err, "Request rejected");
            self.report(&err);
            return Err(err);
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = ClientError::from(e);
                record_request(&method_label, "network_error");
                self.report(&err);
                return Err(err);
            }
        };

        match serde_json::from_slice::<ApiEnvelope<T>>(&bytes) {
            Ok(envelope) => {
                record_request(&method_label, "ok");
                Ok(envelope)
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Response is not a valid envelope");
                let err = ClientError::from(e);
                record_request(&method_label, "decode_error");
                self.report(&err);
                Err(err)
            }
        }
    }

    /// 发出与错误对应的用户通知，401 同时清除本地凭证
    fn report(&self, err: &ClientError) {
        let notice = Notice::error(err.notice_kind(), err.user_message());

        if err.notice_kind() == NoticeKind::SessionExpired {
            if let Err(e) = self.tokens.clear() {
                warn!(error = %e, "Failed to clear stored credentials");
            }
            self.notifier
                .notify(notice.with_redirect(self.login_route.clone()));
            return;
        }

        self.notifier.notify(notice);
    }
}

/// 按状态码分类 HTTP 错误，优先使用服务端返回的 message/detail
pub fn classify_status(status: StatusCode, body: &str) -> ClientError {
    let server_message = extract_server_message(body);

    match status.as_u16() {
        401 => ClientError::Unauthorized(
            server_message.unwrap_or_else(|| "Session expired".to_string()),
        ),
        403 => ClientError::Forbidden(
            server_message.unwrap_or_else(|| "Permission denied".to_string()),
        ),
        code @ 500..=599 => ClientError::Server {
            status: code,
            message: server_message
                .unwrap_or_else(|| "Server error, please try again later".to_string()),
        },
        code => ClientError::Http {
            status: code,
            message: server_message
                .unwrap_or_else(|| format!("Request failed with status {}", code)),
        },
    }
}

fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    ["message", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(readable_message))
}

/// 只接受可读文本；校验错误数组取第一条的 msg，其余结构交给默认文案
fn readable_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items.first().and_then(|item| match item {
            serde_json::Value::String(_) => readable_message(item),
            _ => item.get("msg").and_then(readable_message),
        }),
        _ => None,
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, ClientError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Config("API base URL is empty".to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn record_request(method: &str, outcome: &'static str) {
    metrics::counter!(
        "console_http_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
