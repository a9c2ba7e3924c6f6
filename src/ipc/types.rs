use std::collections::HashMap;
use std::path::PathBuf;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::permissions::PermissionTree;
use crate::wizard::WizardController;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A role's tree while it is being edited. `dirty` is set by toggles and
/// resets and cleared once the tree is saved.
#[derive(Debug, Clone)]
pub struct RoleEditor {
    pub tree: PermissionTree,
    pub dirty: bool,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub user: Option<SessionUser>,
    pub wizard: Option<WizardController>,
    pub roles: HashMap<String, RoleEditor>,
}
