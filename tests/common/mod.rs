//! 测试公共模块
//! 启动一个进程内的模拟后端，并提供构建客户端的辅助函数

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use admin_console::{
    notify::MemoryNotifier,
    storage::{MemoryTokenStore, TokenStore},
    ApiClient,
};
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Json, Router,
};
use serde_json::{json, Value};

pub const API_PREFIX: &str = "/api/v1";

/// 模拟后端收到的一次请求
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub workspace_header: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct BackendState {
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl BackendState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

/// 启动模拟后端（随机端口）
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(BackendState::default());
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend crashed");
    });

    MockBackend {
        base_url: format!("http://{}{}", addr, API_PREFIX),
        state,
    }
}

/// 构建指向模拟后端的客户端
pub fn client_for(
    base_url: &str,
    token: Option<&str>,
    timeout: Duration,
) -> (Arc<ApiClient>, Arc<MemoryTokenStore>, Arc<MemoryNotifier>) {
    let tokens = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    });
    let notifier = Arc::new(MemoryNotifier::new());

    let client = ApiClient::new(
        base_url,
        timeout,
        tokens.clone() as Arc<dyn TokenStore>,
        notifier.clone(),
    )
    .expect("Failed to build client");

    (Arc::new(client), tokens, notifier)
}

/// 首页 + 工作空间 10 的缺陷模块
pub fn scenario_forest() -> Value {
    json!([
        {"id": 1, "code": "dashboard", "name": "Dashboard", "page_path": "/"},
        {"id": 2, "code": "module:bugs", "name": "Bugs", "page_path": "/bugs", "workspace_id": 10,
         "children": [
            {"id": 3, "code": "module:bugs:list", "name": "Bug list", "page_path": "/bugs/list",
             "parent_id": 2, "workspace_id": 10}
         ]},
        {"id": 20, "code": "system", "name": "System", "children": [
            {"id": 21, "code": "system:roles", "name": "Roles", "page_path": "/roles", "parent_id": 20}
        ]}
    ])
}

fn ok(data: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "ok", "data": data})),
    )
}

fn workspaces() -> Value {
    json!([
        {"id": 1, "name": "Default", "is_default": true},
        {"id": 5, "name": "Payments", "is_default": false}
    ])
}

async fn handle(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let body: Option<Value> = serde_json::from_str(&body).ok();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: header("authorization"),
        workspace_header: header("x-workspace-id"),
        body: body.clone(),
    });

    match (method.as_str(), path.as_str()) {
        ("GET", "/permissions/tree") => ok(scenario_forest()),
        ("GET", "/roles") => ok(json!([
            {"id": 7, "name": "developer", "status": "active"},
            {"id": 8, "name": "auditor", "status": "disabled", "description": "read only"}
        ])),
        ("GET", "/roles/7/permissions") => ok(json!([
            {"id": 21, "code": "system:roles", "name": "Roles", "page_path": "/roles"}
        ])),
        ("PUT", "/roles/7/permissions") => ok(Value::Null),
        ("POST", "/roles") => {
            let body = body.unwrap_or(Value::Null);
            ok(json!({
                "id": 99,
                "name": body["name"],
                "status": "active",
                "permissions": []
            }))
        }
        ("GET", "/documents") => ok(json!({
            "items": [{"id": 1, "title": "Runbook"}],
            "total": 1, "page": 1, "page_size": 20
        })),
        ("POST", "/documents") => ok(json!({"id": 2, "title": body.unwrap_or_default()["title"]})),
        ("GET", "/workspaces") => ok(workspaces()),
        ("GET", "/workspaces/default") => ok(json!({"id": 1, "name": "Default", "is_default": true})),
        ("POST", "/workspaces") => ok(json!({"id": 6, "name": "New"})),
        ("GET", "/workspaces/5/members") => ok(json!([
            {"user_id": 3, "workspace_id": 5, "username": "alice", "role": "admin"}
        ])),
        ("GET", "/bugs/4/occurrences") => ok(json!([])),
        ("GET", "/protected") => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token expired"})),
        ),
        ("GET", "/forbidden") => (
            StatusCode::FORBIDDEN,
            Json(json!({"success": false, "message": "Workspace admin only"})),
        ),
        ("GET", "/boom") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "message": "database unavailable"})),
        ),
        ("GET", "/business-fail") => (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Name exists", "error_code": "DUPLICATE"})),
        ),
        ("GET", "/null-data") => (
            StatusCode::OK,
            Json(json!({"success": true, "message": "", "data": null})),
        ),
        // 未经信封包装的返回体，例如网关直接透传的数据
        ("GET", "/bare-payload") => (StatusCode::OK, Json(json!({"items": [1, 2, 3]}))),
        ("GET", "/slow") => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            ok(Value::Null)
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Not Found"})),
        ),
    }
}
