//! Permission tree domain models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 模块权限编码前缀
pub const MODULE_CODE_PREFIX: &str = "module:";
/// 首页权限的页面路径
pub const HOME_PAGE_PATH: &str = "/";

/// Permission node
///
/// 后端返回的是一片森林：顶层节点没有 parent_id，children 递归嵌套。
/// 有 page_path 的节点对应可访问页面，没有的只是分组节点。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub page_path: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub workspace_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<Permission>,
}

impl Permission {
    pub fn new(id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            page_path: None,
            parent_id: None,
            workspace_id: None,
            description: None,
            children: Vec::new(),
        }
    }

    pub fn page(mut self, path: impl Into<String>) -> Self {
        self.page_path = Some(path.into());
        self
    }

    pub fn in_workspace(mut self, workspace_id: i64) -> Self {
        self.workspace_id = Some(workspace_id);
        self
    }

    pub fn child(mut self, mut child: Permission) -> Self {
        child.parent_id = Some(self.id);
        self.children.push(child);
        self
    }

    /// 是否对应一个可访问页面（可授予）
    pub fn is_page(&self) -> bool {
        self.page_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// 是否为模块权限
    pub fn is_module(&self) -> bool {
        self.code.starts_with(MODULE_CODE_PREFIX)
    }

    /// 是否为首页权限
    pub fn is_home(&self) -> bool {
        self.page_path.as_deref() == Some(HOME_PAGE_PATH)
    }
}

/// Create permission request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 255))]
    pub page_path: Option<String>,
    pub parent_id: Option<i64>,
    pub workspace_id: Option<i64>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Update permission request
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdatePermissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub page_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_classification() {
        let home = Permission::new(1, "dashboard", "Dashboard").page("/");
        assert!(home.is_home());
        assert!(home.is_page());
        assert!(!home.is_module());

        let group = Permission::new(2, "module:bugs", "Bugs");
        assert!(group.is_module());
        assert!(!group.is_page());

        let empty_path = Permission::new(3, "x", "X").page("");
        assert!(!empty_path.is_page());
    }

    #[test]
    fn test_deserialize_nested_tree() {
        let raw = r#"{
            "id": 2, "code": "module:bugs", "name": "Bugs", "page_path": "/bugs",
            "workspace_id": 10,
            "children": [{"id": 3, "code": "module:bugs:list", "name": "List",
                          "page_path": "/bugs/list", "parent_id": 2, "workspace_id": 10}]
        }"#;
        let node: Permission = serde_json::from_str(raw).unwrap();
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].parent_id, Some(2));
        assert!(node.children[0].children.is_empty());
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreatePermissionRequest {
            code: String::new(),
            name: "Docs".into(),
            page_path: Some("/docs".into()),
            parent_id: None,
            workspace_id: None,
            description: None,
        };
        assert!(req.validate().is_err());
    }
}
