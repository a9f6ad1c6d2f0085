//! Department tree

use serde::Serialize;
use shared::models::{Department, ROOT_DEPARTMENT_ID};

use super::tree::{TreeItem, build_tree};

impl TreeItem for Department {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> i64 {
        self.parent_id
    }

    fn order(&self) -> i64 {
        self.order
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentNode {
    #[serde(flatten)]
    pub department: Department,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DepartmentNode>,
}

/// 部门树: 父部门缺失的节点提升为根
pub fn build_department_tree(departments: &[Department]) -> Vec<DepartmentNode> {
    build_tree(departments, ROOT_DEPARTMENT_ID, |department, children| DepartmentNode {
        department: department.clone(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(id: i64, parent_id: i64, order: i64) -> Department {
        Department {
            id,
            name: format!("d{id}"),
            manager_name: None,
            manager_id: None,
            order,
            parent_id,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_children_sorted_by_order() {
        let departments = [dept(1, 0, 0), dept(2, 1, 2), dept(3, 1, 1), dept(4, 2, 0)];
        let tree = build_department_tree(&departments);
        assert_eq!(tree.len(), 1);
        let children: Vec<i64> = tree[0].children.iter().map(|n| n.department.id).collect();
        assert_eq!(children, vec![3, 2]);
        assert_eq!(tree[0].children[1].children[0].department.id, 4);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let departments = [dept(1, 0, 1), dept(5, 42, 0)];
        let tree = build_department_tree(&departments);
        let roots: Vec<i64> = tree.iter().map(|n| n.department.id).collect();
        assert_eq!(roots, vec![5, 1]);
    }

    #[test]
    fn test_leaf_has_no_children_key() {
        let tree = build_department_tree(&[dept(1, 0, 0)]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["name"], "d1");
        assert_eq!(json[0]["parentId"], 0);
        assert!(json[0].get("children").is_none());
    }
}
