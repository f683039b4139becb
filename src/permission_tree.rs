//! 权限树算法
//!
//! 纯函数，输入都是后端返回的权限森林。选择状态由 `role_editor` 持有，
//! 这里只负责分区、遍历、勾选传播和提交过滤。

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::models::permission::Permission;

/// 独立渲染的一棵权限树
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TreeWidget {
    /// 系统权限
    System,
    /// 某个工作空间的模块权限
    Workspace(i64),
    /// 没有 workspace_id 的模块权限
    Ungrouped,
}

impl fmt::Display for TreeWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeWidget::System => write!(f, "system"),
            TreeWidget::Workspace(id) => write!(f, "workspace:{}", id),
            TreeWidget::Ungrouped => write!(f, "ungrouped"),
        }
    }
}

/// 按系统权限 / 模块权限拆分后的森林
///
/// 以顶层节点为单位拆分，子节点跟随父节点，因此各分区的 ID 互不相交
#[derive(Debug, Clone, Default)]
pub struct PartitionedTree {
    pub system: Vec<Permission>,
    pub modules: BTreeMap<i64, Vec<Permission>>,
    pub ungrouped: Vec<Permission>,
}

impl PartitionedTree {
    pub fn partition(forest: Vec<Permission>) -> Self {
        let mut tree = Self::default();

        for node in forest {
            if !node.is_module() {
                tree.system.push(node);
                continue;
            }

            match node.workspace_id {
                Some(workspace_id) => tree.modules.entry(workspace_id).or_default().push(node),
                None => tree.ungrouped.push(node),
            }
        }

        tree
    }

    /// 所有非空的树，顺序为系统、各工作空间、未分组
    pub fn widgets(&self) -> Vec<TreeWidget> {
        let mut widgets = Vec::new();
        if !self.system.is_empty() {
            widgets.push(TreeWidget::System);
        }
        widgets.extend(
            self.modules
                .iter()
                .filter(|(_, nodes)| !nodes.is_empty())
                .map(|(id, _)| TreeWidget::Workspace(*id)),
        );
        if !self.ungrouped.is_empty() {
            widgets.push(TreeWidget::Ungrouped);
        }
        widgets
    }

    pub fn nodes(&self, widget: TreeWidget) -> &[Permission] {
        match widget {
            TreeWidget::System => &self.system,
            TreeWidget::Workspace(id) => self.modules.get(&id).map(Vec::as_slice).unwrap_or(&[]),
            TreeWidget::Ungrouped => &self.ungrouped,
        }
    }

    /// 系统 + 全部模块分区的顶层节点
    pub fn roots(&self) -> impl Iterator<Item = &Permission> {
        self.system
            .iter()
            .chain(self.modules.values().flatten())
            .chain(self.ungrouped.iter())
    }

    /// 某棵树包含的全部节点 ID
    pub fn widget_ids(&self, widget: TreeWidget) -> BTreeSet<i64> {
        id_set(self.nodes(widget))
    }

    /// 节点所在的树
    pub fn widget_of(&self, id: i64) -> Option<TreeWidget> {
        self.widgets()
            .into_iter()
            .find(|w| find(self.nodes(*w), id).is_some())
    }
}

/// 先序遍历收集所有节点 ID（含嵌套 children）
pub fn collect_ids(nodes: &[Permission], out: &mut Vec<i64>) {
    for node in nodes {
        out.push(node.id);
        collect_ids(&node.children, out);
    }
}

pub fn id_set(nodes: &[Permission]) -> BTreeSet<i64> {
    let mut ids = Vec::new();
    collect_ids(nodes, &mut ids);
    ids.into_iter().collect()
}

/// 深度优先查找第一个首页权限
pub fn find_home<'a, I>(roots: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a Permission>,
{
    fn walk(node: &Permission) -> Option<i64> {
        if node.is_home() {
            return Some(node.id);
        }
        node.children.iter().find_map(walk)
    }

    roots.into_iter().find_map(walk)
}

pub fn find(nodes: &[Permission], id: i64) -> Option<&Permission> {
    nodes.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find(&node.children, id)
        }
    })
}

/// 从根到目标节点的路径（不含目标节点本身）
fn ancestors_of(nodes: &[Permission], id: i64) -> Option<Vec<&Permission>> {
    for node in nodes {
        if node.id == id {
            return Some(Vec::new());
        }
        if let Some(mut path) = ancestors_of(&node.children, id) {
            path.insert(0, node);
            return Some(path);
        }
    }
    None
}

/// 勾选/取消勾选一个节点后，该树新的勾选集合
///
/// 与树形复选框的联动规则一致：子孙节点跟随目标节点；祖先节点只有在
/// 全部子节点都被勾选时才算勾选。`current` 中不属于该树的 ID 会被丢弃。
pub fn propagate_check(
    nodes: &[Permission],
    current: &BTreeSet<i64>,
    id: i64,
    checked: bool,
) -> BTreeSet<i64> {
    let own = id_set(nodes);
    let mut next: BTreeSet<i64> = current.intersection(&own).copied().collect();

    let Some(target) = find(nodes, id) else {
        return next;
    };

    let mut subtree = Vec::new();
    collect_ids(std::slice::from_ref(target), &mut subtree);
    for sub_id in subtree {
        if checked {
            next.insert(sub_id);
        } else {
            next.remove(&sub_id);
        }
    }

    if let Some(path) = ancestors_of(nodes, id) {
        for ancestor in path.iter().rev() {
            let all_checked = ancestor
                .children
                .iter()
                .all(|child| next.contains(&child.id));
            if all_checked {
                next.insert(ancestor.id);
            } else {
                next.remove(&ancestor.id);
            }
        }
    }

    next
}

/// 计算最终提交的权限 ID
///
/// 只提交已勾选且有 page_path 的节点；分组节点即使勾选也会被过滤。
/// 首页权限无论如何都会被包含。
pub fn submission_ids<'a, I>(roots: I, checked: &BTreeSet<i64>, home: Option<i64>) -> Vec<i64>
where
    I: IntoIterator<Item = &'a Permission>,
{
    fn walk(node: &Permission, checked: &BTreeSet<i64>, out: &mut Vec<i64>) {
        if node.is_page() && checked.contains(&node.id) {
            out.push(node.id);
        }
        for child in &node.children {
            walk(child, checked, out);
        }
    }

    let mut ids = Vec::new();
    for root in roots {
        walk(root, checked, &mut ids);
    }

    if let Some(home) = home {
        if !ids.contains(&home) {
            ids.insert(0, home);
        }
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Vec<Permission> {
        vec![
            Permission::new(1, "dashboard", "Dashboard").page("/"),
            Permission::new(20, "system", "System")
                .child(Permission::new(21, "system:roles", "Roles").page("/roles"))
                .child(Permission::new(22, "system:users", "Users").page("/users")),
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
                .child(Permission::new(5, "module:docs:list", "Doc list").page("/docs").in_workspace(11))
                .child(Permission::new(6, "module:docs:edit", "Doc edit").page("/docs/edit").in_workspace(11)),
            Permission::new(7, "module:misc", "Misc").page("/misc"),
        ]
    }

    #[test]
    fn test_partition() {
        let tree = PartitionedTree::partition(forest());
        assert_eq!(tree.system.len(), 2);
        assert_eq!(tree.modules.len(), 2);
        assert_eq!(tree.ungrouped.len(), 1);
        assert_eq!(
            tree.widgets(),
            vec![
                TreeWidget::System,
                TreeWidget::Workspace(10),
                TreeWidget::Workspace(11),
                TreeWidget::Ungrouped
            ]
        );
        assert_eq!(tree.widget_of(6), Some(TreeWidget::Workspace(11)));
        assert_eq!(tree.widget_of(99), None);
        assert!(tree.nodes(TreeWidget::Workspace(404)).is_empty());
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let all = id_set(&forest());
        let tree = PartitionedTree::partition(forest());

        let mut seen = BTreeSet::new();
        for widget in tree.widgets() {
            for id in tree.widget_ids(widget) {
                assert!(seen.insert(id), "id {} appears in more than one tree", id);
            }
        }
        assert_eq!(seen, all);
    }

    #[test]
    fn test_collect_ids_preorder() {
        let mut ids = Vec::new();
        collect_ids(&forest(), &mut ids);
        assert_eq!(ids, vec![1, 20, 21, 22, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_find_home_nested_and_missing() {
        let nested = vec![Permission::new(9, "root", "Root")
            .child(Permission::new(10, "home", "Home").page("/"))];
        assert_eq!(find_home(&nested), Some(10));

        let none = vec![Permission::new(1, "x", "X").page("/x")];
        assert_eq!(find_home(&none), None);
    }

    #[test]
    fn test_propagate_check_children_follow_parent() {
        let tree = PartitionedTree::partition(forest());
        let nodes = tree.nodes(TreeWidget::Workspace(11));

        let checked = propagate_check(nodes, &BTreeSet::new(), 4, true);
        assert_eq!(checked, BTreeSet::from([4, 5, 6]));

        let unchecked = propagate_check(nodes, &checked, 4, false);
        assert!(unchecked.is_empty());
    }

    #[test]
    fn test_propagate_check_parent_follows_children() {
        let tree = PartitionedTree::partition(forest());
        let nodes = tree.nodes(TreeWidget::Workspace(11));

        let one = propagate_check(nodes, &BTreeSet::new(), 5, true);
        assert_eq!(one, BTreeSet::from([5]));

        let both = propagate_check(nodes, &one, 6, true);
        assert_eq!(both, BTreeSet::from([4, 5, 6]));

        let partial = propagate_check(nodes, &both, 5, false);
        assert_eq!(partial, BTreeSet::from([6]));
    }

    #[test]
    fn test_propagate_check_drops_foreign_ids() {
        let tree = PartitionedTree::partition(forest());
        let nodes = tree.nodes(TreeWidget::Workspace(10));

        let next = propagate_check(nodes, &BTreeSet::from([1, 5]), 3, true);
        assert_eq!(next, BTreeSet::from([2, 3]));
    }

    #[test]
    fn test_submission_filters_group_nodes() {
        let tree = PartitionedTree::partition(forest());
        let checked = BTreeSet::from([1, 20, 21, 4, 5, 6]);

        let ids = submission_ids(tree.roots(), &checked, Some(1));
        assert_eq!(ids, vec![1, 21, 5, 6]);
    }

    #[test]
    fn test_submission_forces_home() {
        let tree = PartitionedTree::partition(forest());
        let ids = submission_ids(tree.roots(), &BTreeSet::from([3]), Some(1));
        assert_eq!(ids, vec![1, 3]);

        let ids = submission_ids(tree.roots(), &BTreeSet::from([3]), None);
        assert_eq!(ids, vec![3]);
    }
}
