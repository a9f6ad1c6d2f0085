//! 导航模块
//!
//! Pure tree building over menus, buttons, apis and departments. The only I/O is the
//! role-scoped ancestor walk in [`role_menus`], which reads through
//! [`crate::db::IdentityStore`].

pub mod api_tree;
pub mod button_tree;
pub mod department_tree;
pub mod projection;
pub mod role_menus;
pub mod tree;

pub use api_tree::{ApiTreeNode, build_api_tree};
pub use button_tree::{ButtonTreeNode, build_button_tree};
pub use department_tree::{DepartmentNode, build_department_tree};
pub use projection::{
    ButtonsByMenu, FullMenu, MenuLabel, MenuTreeNode, SimpleRoute, build_menu_tree, full_tree,
    group_buttons, label_tree, route_tree,
};
pub use role_menus::{UserRoutes, build_role_menu_tree, build_user_routes, resolve_role_menus};
pub use tree::{TreeItem, build_tree};
