//! Api tree grouped by tag path
//!
//! Each api walks its tags; tag `t` becomes the group node `"parent$t"`,
//! created once under the first parent it was seen with. The api itself is
//! appended as a leaf under its last tag (at top level when untagged).

use std::collections::HashMap;

use serde::Serialize;
use shared::models::Api;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiTreeNode {
    Group {
        id: String,
        summary: String,
        children: Vec<ApiTreeNode>,
    },
    Api {
        id: i64,
        summary: String,
    },
}

enum Slot {
    Group(usize),
    Api(i64, String),
}

struct Group {
    id: String,
    summary: String,
    slots: Vec<Slot>,
}

pub fn build_api_tree(apis: &[Api]) -> Vec<ApiTreeNode> {
    let mut sorted: Vec<&Api> = apis.iter().collect();
    sorted.sort_by_key(|a| a.id);

    // index 0 is the invisible root
    let mut groups = vec![Group {
        id: String::new(),
        summary: String::new(),
        slots: Vec::new(),
    }];
    let mut by_tag: HashMap<&str, usize> = HashMap::new();

    for api in sorted {
        let mut parent = 0;
        for tag in &api.tags {
            let idx = match by_tag.get(tag.as_str()) {
                Some(idx) => *idx,
                None => {
                    let idx = groups.len();
                    groups.push(Group {
                        id: format!("parent${tag}"),
                        summary: tag.clone(),
                        slots: Vec::new(),
                    });
                    groups[parent].slots.push(Slot::Group(idx));
                    by_tag.insert(tag.as_str(), idx);
                    idx
                }
            };
            parent = idx;
        }
        groups[parent]
            .slots
            .push(Slot::Api(api.id, api.summary.clone()));
    }

    materialize(&groups, 0)
}

fn materialize(groups: &[Group], idx: usize) -> Vec<ApiTreeNode> {
    groups[idx]
        .slots
        .iter()
        .map(|slot| match slot {
            Slot::Group(child) => ApiTreeNode::Group {
                id: groups[*child].id.clone(),
                summary: groups[*child].summary.clone(),
                children: materialize(groups, *child),
            },
            Slot::Api(id, summary) => ApiTreeNode::Api {
                id: *id,
                summary: summary.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::memory::api;
    use serde_json::json;
    use shared::models::{MethodType, StatusType};

    fn tagged(id: i64, summary: &str, tags: &[&str]) -> Api {
        let mut a = api(id, MethodType::Get, "/x", StatusType::Enable);
        a.summary = summary.into();
        a.tags = tags.iter().map(|t| t.to_string()).collect();
        a
    }

    #[test]
    fn test_groups_by_tag_path() {
        let apis = vec![
            tagged(3, "查看用户", &["系统管理", "用户管理"]),
            tagged(1, "健康检查", &[]),
            tagged(2, "查看角色", &["系统管理", "角色管理"]),
        ];

        let value = serde_json::to_value(build_api_tree(&apis)).unwrap();
        assert_eq!(
            value,
            json!([
                {"id": 1, "summary": "健康检查"},
                {"id": "parent$系统管理", "summary": "系统管理", "children": [
                    {"id": "parent$角色管理", "summary": "角色管理", "children": [
                        {"id": 2, "summary": "查看角色"}
                    ]},
                    {"id": "parent$用户管理", "summary": "用户管理", "children": [
                        {"id": 3, "summary": "查看用户"}
                    ]}
                ]}
            ])
        );
    }

    #[test]
    fn test_first_parent_wins() {
        let apis = vec![tagged(1, "a", &["x", "y"]), tagged(2, "b", &["y"])];
        let tree = build_api_tree(&apis);
        assert_eq!(tree.len(), 1);
        let ApiTreeNode::Group { children, .. } = &tree[0] else {
            panic!("expected group");
        };
        let ApiTreeNode::Group { id, children, .. } = &children[0] else {
            panic!("expected group");
        };
        assert_eq!(id, "parent$y");
        assert_eq!(children.len(), 2);
    }
}
