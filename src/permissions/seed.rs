use super::{ActionFlags, PermissionNode};

pub fn default_actions() -> Vec<String> {
    ["view", "create", "edit", "delete", "export"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Menus a fresh role starts with, every action off.
pub fn default_menu_seed<S: AsRef<str>>(actions: &[S]) -> Vec<PermissionNode> {
    let off = || ActionFlags::none(actions);
    vec![
        PermissionNode::new("Dashboard", off()),
        PermissionNode::new("Exams", off()).with_submenus(vec![
            PermissionNode::new("Create Question", off()),
            PermissionNode::new("Question Sets", off()),
        ]),
        PermissionNode::new("Permissions", off()),
        PermissionNode::new("Menus", off()).with_submenus(vec![
            PermissionNode::new("Menu List", off()),
            PermissionNode::new("Submenu List", off()),
        ]),
        PermissionNode::new("Settings", off()),
    ]
}
