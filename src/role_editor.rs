//! 角色权限编辑
//!
//! 一次编辑会话持有唯一的全局勾选集合。每棵权限树（系统权限、各工作空间
//! 的模块权限）只拿到属于自己的过滤视图，树上的勾选变化再合并回全局集合，
//! 不会影响其它树的选择。首页权限始终保持勾选。

use std::collections::{BTreeMap, BTreeSet};

use crate::api::{PermissionApi, RoleApi};
use crate::error::ClientError;
use crate::models::permission::Permission;
use crate::models::role::{CreateRoleRequest, Role};
use crate::notify::Notice;
use crate::permission_tree::{self, PartitionedTree, TreeWidget};

/// 提交空权限列表时的提示
pub const EMPTY_SUBMISSION_WARNING: &str = "No page permissions selected for this role";

#[derive(Debug, Clone)]
pub struct RoleEditor {
    role_id: Option<i64>,
    tree: PartitionedTree,
    home_id: Option<i64>,
    checked: BTreeSet<i64>,
    widget_ids: BTreeMap<TreeWidget, BTreeSet<i64>>,
}

impl RoleEditor {
    /// 新建角色：只勾选首页权限
    pub fn open_new(forest: Vec<Permission>) -> Self {
        Self::open(forest, None, std::iter::empty())
    }

    /// 编辑已有角色：以角色当前的权限初始化
    pub fn open_existing<I>(forest: Vec<Permission>, role_id: i64, granted: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self::open(forest, Some(role_id), granted)
    }

    fn open<I>(forest: Vec<Permission>, role_id: Option<i64>, granted: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let home_id = permission_tree::find_home(&forest);
        if home_id.is_none() {
            tracing::warn!("Home page permission not found in permission tree");
        }

        let tree = PartitionedTree::partition(forest);
        let widget_ids = tree
            .widgets()
            .into_iter()
            .map(|w| (w, tree.widget_ids(w)))
            .collect();

        let mut editor = Self {
            role_id,
            tree,
            home_id,
            checked: granted.into_iter().collect(),
            widget_ids,
        };
        editor.ensure_home();

        tracing::debug!(
            role_id = ?role_id,
            checked = editor.checked.len(),
            widgets = editor.widget_ids.len(),
            "Role editor opened"
        );
        editor
    }

    /// 拉取权限树（以及已有角色的权限）并打开编辑会话
    pub async fn load(
        permissions: &PermissionApi,
        roles: &RoleApi,
        role_id: Option<i64>,
    ) -> Result<Self, ClientError> {
        let forest = permissions.tree().await?;

        match role_id {
            Some(id) => {
                let granted = roles.permissions(id).await?;
                let mut ids = Vec::new();
                permission_tree::collect_ids(&granted, &mut ids);
                Ok(Self::open_existing(forest, id, ids))
            }
            None => Ok(Self::open_new(forest)),
        }
    }

    /// 由角色详情打开（角色详情已带有 permissions）
    pub fn for_role(forest: Vec<Permission>, role: &Role) -> Self {
        Self::open_existing(forest, role.id, role.granted_ids())
    }

    fn ensure_home(&mut self) {
        if let Some(home) = self.home_id {
            self.checked.insert(home);
        }
    }

    pub fn role_id(&self) -> Option<i64> {
        self.role_id
    }

    pub fn home_id(&self) -> Option<i64> {
        self.home_id
    }

    pub fn tree(&self) -> &PartitionedTree {
        &self.tree
    }

    /// 全局勾选集合
    pub fn checked(&self) -> &BTreeSet<i64> {
        &self.checked
    }

    pub fn widgets(&self) -> Vec<TreeWidget> {
        self.widget_ids.keys().copied().collect()
    }

    /// 节点复选框是否禁用（首页权限不可取消）
    pub fn is_disabled(&self, id: i64) -> bool {
        self.home_id == Some(id)
    }

    /// 某棵树的过滤视图：全局集合与该树节点集合的交集
    pub fn view(&self, widget: TreeWidget) -> BTreeSet<i64> {
        match self.widget_ids.get(&widget) {
            Some(ids) => self.checked.intersection(ids).copied().collect(),
            None => BTreeSet::new(),
        }
    }

    /// 合并某棵树发出的新勾选集合
    ///
    /// 先移除该树的全部 ID，再并入新集合（只接受属于该树的 ID），最后补回首页权限
    pub fn apply_widget_check<I>(&mut self, widget: TreeWidget, emitted: I)
    where
        I: IntoIterator<Item = i64>,
    {
        let Some(own) = self.widget_ids.get(&widget) else {
            tracing::warn!(widget = %widget, "Ignoring check event from unknown permission tree");
            return;
        };

        self.checked.retain(|id| !own.contains(id));
        self.checked
            .extend(emitted.into_iter().filter(|id| own.contains(id)));
        self.ensure_home();
    }

    /// 在某棵树上勾选/取消勾选一个节点，按树形复选框规则联动子孙与祖先
    ///
    /// 首页权限的复选框是禁用的，对它的操作会被忽略。返回是否产生了变化。
    pub fn toggle(&mut self, widget: TreeWidget, id: i64, checked: bool) -> bool {
        if self.is_disabled(id) {
            tracing::debug!(permission_id = id, "Home page permission cannot be toggled");
            return false;
        }

        let in_widget = self
            .widget_ids
            .get(&widget)
            .is_some_and(|ids| ids.contains(&id));
        if !in_widget {
            tracing::warn!(widget = %widget, permission_id = id, "Permission is not part of this tree");
            return false;
        }

        let before = self.checked.clone();
        let next = permission_tree::propagate_check(
            self.tree.nodes(widget),
            &self.view(widget),
            id,
            checked,
        );
        self.apply_widget_check(widget, next);

        before != self.checked
    }

    /// 最终提交的权限 ID
    pub fn submission(&self) -> Vec<i64> {
        permission_tree::submission_ids(self.tree.roots(), &self.checked, self.home_id)
    }

    /// 提交到已有角色，会话随之结束
    ///
    /// 结果为空时仍然提交，但会给出提示
    pub async fn submit(self, roles: &RoleApi) -> Result<Vec<i64>, ClientError> {
        let Some(role_id) = self.role_id else {
            return Err(ClientError::Validation(
                "Role must be created before assigning permissions".to_string(),
            ));
        };

        let ids = self.submission();
        warn_if_empty(roles, &ids);

        roles.assign_permissions(role_id, ids.clone()).await?;
        Ok(ids)
    }

    /// 新建角色并附带当前勾选的权限，会话随之结束
    pub async fn create_role(
        self,
        roles: &RoleApi,
        mut req: CreateRoleRequest,
    ) -> Result<Role, ClientError> {
        let ids = self.submission();
        warn_if_empty(roles, &ids);

        req.permission_ids = ids;
        roles.create(&req).await
    }
}

fn warn_if_empty(roles: &RoleApi, ids: &[i64]) {
    if ids.is_empty() {
        tracing::warn!("Submitting role without any page permissions");
        roles
            .client()
            .notifier()
            .notify(Notice::warning(EMPTY_SUBMISSION_WARNING));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 首页 + 工作空间 10 的缺陷模块（含子页面）
    fn scenario_forest() -> Vec<Permission> {
        vec![
            Permission::new(1, "dashboard", "Dashboard").page("/"),
            Permission::new(2, "module:bugs", "Bugs")
                .page("/bugs")
                .in_workspace(10)
                .child(
                    Permission::new(3, "module:bugs:list", "Bug list")
                        .page("/bugs/list")
                        .in_workspace(10),
                ),
        ]
    }

    fn wide_forest() -> Vec<Permission> {
        vec![
            Permission::new(1, "dashboard", "Dashboard").page("/"),
            Permission::new(30, "settings", "Settings")
                .child(Permission::new(31, "settings:roles", "Roles").page("/settings/roles")),
            Permission::new(2, "module:bugs", "Bugs")
                .page("/bugs")
                .in_workspace(10)
                .child(
                    Permission::new(3, "module:bugs:list", "Bug list")
                        .page("/bugs/list")
                        .in_workspace(10),
                ),
            Permission::new(4, "module:docs", "Docs")
                .in_workspace(11)
                .child(Permission::new(5, "module:docs:list", "Docs").page("/docs").in_workspace(11)),
        ]
    }

    #[test]
    fn test_new_role_starts_with_home() {
        let editor = RoleEditor::open_new(scenario_forest());
        assert_eq!(editor.home_id(), Some(1));
        assert_eq!(editor.checked(), &BTreeSet::from([1]));
        assert!(editor.is_disabled(1));
        assert!(!editor.is_disabled(2));
    }

    #[test]
    fn test_existing_role_adds_home_if_missing() {
        let editor = RoleEditor::open_existing(wide_forest(), 7, vec![31, 5]);
        assert_eq!(editor.checked(), &BTreeSet::from([1, 5, 31]));
        assert_eq!(editor.role_id(), Some(7));
    }

    #[test]
    fn test_check_parent_in_workspace_tree() {
        let mut editor = RoleEditor::open_new(scenario_forest());

        assert!(editor.toggle(TreeWidget::Workspace(10), 2, true));
        assert_eq!(editor.checked(), &BTreeSet::from([1, 2, 3]));
        assert_eq!(editor.submission(), vec![1, 2, 3]);
    }

    #[test]
    fn test_home_cannot_be_unchecked() {
        let mut editor = RoleEditor::open_new(scenario_forest());

        assert!(!editor.toggle(TreeWidget::System, 1, false));
        assert!(editor.checked().contains(&1));

        // 即使树发出的集合里没有首页，也会被补回
        editor.apply_widget_check(TreeWidget::System, Vec::new());
        assert!(editor.checked().contains(&1));
    }

    #[test]
    fn test_cross_tree_isolation() {
        let mut editor = RoleEditor::open_existing(wide_forest(), 7, vec![31]);
        let system_before = editor.view(TreeWidget::System);
        let docs_before = editor.view(TreeWidget::Workspace(11));

        editor.toggle(TreeWidget::Workspace(10), 3, true);

        assert_eq!(editor.view(TreeWidget::System), system_before);
        assert_eq!(editor.view(TreeWidget::Workspace(11)), docs_before);
        assert_eq!(editor.view(TreeWidget::Workspace(10)), BTreeSet::from([2, 3]));
    }

    #[test]
    fn test_foreign_ids_from_widget_are_ignored() {
        let mut editor = RoleEditor::open_new(wide_forest());
        editor.apply_widget_check(TreeWidget::Workspace(11), vec![4, 5, 31]);

        assert_eq!(editor.checked(), &BTreeSet::from([1, 4, 5]));
        assert!(editor.view(TreeWidget::System).contains(&1));
        assert!(!editor.view(TreeWidget::System).contains(&31));
    }

    #[test]
    fn test_unknown_widget_is_noop() {
        let mut editor = RoleEditor::open_new(wide_forest());
        editor.apply_widget_check(TreeWidget::Workspace(99), vec![2, 3]);
        assert_eq!(editor.checked(), &BTreeSet::from([1]));
        assert!(!editor.toggle(TreeWidget::Workspace(99), 2, true));
        assert!(editor.view(TreeWidget::Ungrouped).is_empty());
    }

    #[test]
    fn test_group_node_bulk_selects_but_is_not_submitted() {
        let mut editor = RoleEditor::open_new(wide_forest());
        editor.toggle(TreeWidget::Workspace(11), 4, true);

        assert!(editor.checked().contains(&4));
        assert_eq!(editor.submission(), vec![1, 5]);
    }

    #[test]
    fn test_missing_home_degrades_silently() {
        let forest = vec![Permission::new(8, "reports", "Reports").page("/reports")];
        let mut editor = RoleEditor::open_new(forest);

        assert_eq!(editor.home_id(), None);
        assert!(editor.checked().is_empty());
        assert!(editor.submission().is_empty());

        editor.toggle(TreeWidget::System, 8, true);
        assert_eq!(editor.submission(), vec![8]);
    }

    #[test]
    fn test_sentinel_survives_arbitrary_sequences() {
        let mut editor = RoleEditor::open_existing(wide_forest(), 3, vec![1, 2, 3, 4, 5, 30, 31]);
        let ops: &[(TreeWidget, i64, bool)] = &[
            (TreeWidget::System, 30, false),
            (TreeWidget::Workspace(10), 2, false),
            (TreeWidget::System, 1, false),
            (TreeWidget::Workspace(11), 5, false),
            (TreeWidget::System, 31, true),
            (TreeWidget::Workspace(10), 3, true),
            (TreeWidget::System, 30, false),
        ];

        for (widget, id, checked) in ops {
            editor.toggle(*widget, *id, *checked);
            assert!(editor.checked().contains(&1));
            assert!(editor.submission().contains(&1));
        }
    }
}
