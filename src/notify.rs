//! 用户通知
//! 失败请求会产生一条通知（相当于前端的 toast），由 Notifier 实现决定如何展示

use std::sync::Mutex;

use serde::Serialize;

/// 通知类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    SessionExpired,
    Forbidden,
    ServerError,
    Network,
    Http,
    Business,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Error,
    Warning,
}

/// 一条用户可见的通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub message: String,
    /// 需要跳转的路由（会话过期时为登录页）
    pub redirect: Option<String>,
}

impl Notice {
    pub fn error(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            level: NoticeLevel::Error,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            level: NoticeLevel::Warning,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn with_redirect(mut self, route: impl Into<String>) -> Self {
        self.redirect = Some(route.into());
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 将通知写入日志
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!(
                kind = ?notice.kind,
                redirect = ?notice.redirect,
                "{}",
                notice.message
            ),
            NoticeLevel::Warning => tracing::warn!(kind = ?notice.kind, "{}", notice.message),
        }
    }
}

/// 在内存中记录通知，便于调用方检查
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.clear();
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push(notice);
        }
    }
}
