//! 缺陷档案、发生记录与外部缺陷追踪

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BugSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// Bug profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugProfile {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: BugSeverity,
    pub status: BugStatus,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub occurrence_count: u64,
    #[serde(default)]
    pub coding_issue_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateBugRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub severity: BugSeverity,
    #[validate(length(max = 100))]
    pub module: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateBugRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<BugSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BugStatus>,
}

/// Bug list filter
#[derive(Debug, Clone, Default, Serialize)]
pub struct BugQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BugStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<BugSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// 一次缺陷发生记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugOccurrence {
    pub id: i64,
    pub bug_id: i64,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LogOccurrenceRequest {
    #[validate(length(max = 50))]
    pub environment: Option<String>,
    #[validate(length(max = 5000))]
    pub detail: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// 外部缺陷追踪服务中的缺陷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingBug {
    pub id: i64,
    pub issue_code: i64,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub linked_bug_id: Option<i64>,
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
}

/// 外部缺陷追踪服务的连接配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CodingConfig {
    #[validate(url)]
    pub api_url: String,
    #[validate(length(min = 1, max = 100))]
    pub project_name: String,
    /// 服务端返回时为脱敏值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub sync_enabled: bool,
}

/// 同步结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkBugRequest {
    pub bug_id: i64,
}
